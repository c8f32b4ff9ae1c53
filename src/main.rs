use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};

use reposurvey::cli::Cli;
use reposurvey::config;
use reposurvey::report::{json, pretty};
use reposurvey::survey::Surveyor;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let repo = gix::open(&cli.repo_path).with_context(|| {
        format!("failed to open git repository at {}", cli.repo_path.display())
    })?;

    let opts = config::load(&repo, &cli);
    let report = Surveyor::new(opts.clone()).run(&repo)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if opts.json {
        writeln!(out, "{:#}", json::render(&report)).context("failed to write report")?;
    } else {
        pretty::write_report(&report, &mut out).context("failed to write report")?;
    }

    Ok(())
}
