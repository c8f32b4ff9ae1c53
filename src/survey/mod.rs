//! Survey engine
//!
//! Runs the survey as a fixed sequence of phases over an opened
//! repository: load refs, walk every reachable object, calculate ref
//! stats, optionally resolve name-revs, then hand the frozen statistics
//! to the report layer.
//!
//! # Architecture
//!
//! - **refs**: ref discovery and classification
//! - **walk**: reachable-object traversal
//! - **probe**: per-object metadata lookups and the disk-size index
//! - **namerev**: post-walk commit naming via `git name-rev`
//! - **progress**: progress reporting abstraction
//! - this module: phase orchestration and failure policy

pub mod namerev;
pub mod probe;
pub mod progress;
pub mod refs;
pub mod walk;

use anyhow::{bail, Context, Result};
use gix::object::Kind;

use crate::config::Options;
use crate::report::SurveyReport;
use crate::stats::SurveyStats;
use crate::telemetry::Telemetry;
use probe::{object_kind, DiskSizeIndex};
use progress::{IndicatifProgress, NoopProgress, ProgressReporter};
use refs::RefRecord;
use walk::ObjectWalker;

/// Phase driver. A ref-loading failure is fatal; anything after that is
/// reported and the run still produces a (possibly partial) report.
pub struct Surveyor {
    opts: Options,
}

impl Surveyor {
    pub fn new(opts: Options) -> Self {
        Self { opts }
    }

    pub fn run(&self, repo: &gix::Repository) -> Result<SurveyReport> {
        let telemetry = Telemetry::from_env();
        let progress: Box<dyn ProgressReporter> = if self.opts.progress {
            Box::new(IndicatifProgress)
        } else {
            Box::new(NoopProgress)
        };

        self.log("Loading refs...");
        let records = telemetry.phase("load_refs", || {
            refs::discover(repo, &self.opts.refs, progress.as_ref())
        })?;
        self.log(&format!("Found {} refs", records.len()));

        let mut stats = SurveyStats::new(&self.opts.large_caps());

        self.log("Walking reachable objects...");
        let visited = telemetry.phase("walk_objects", || {
            self.walk_objects(repo, &records, &mut stats, progress.as_ref())
        })?;
        self.log(&format!("Visited {} objects", visited));

        telemetry.phase("calc_ref_stats", || {
            refs::calc_ref_stats(&records, &mut stats.refs, progress.as_ref());
        });

        if self.opts.name_rev {
            self.log("Resolving name-revs...");
            let complete = telemetry.phase("name_rev", || {
                namerev::enrich(&mut stats, repo.git_dir(), progress.as_ref())
            });
            if !complete {
                self.log("name-rev resolution failed, reporting raw OIDs");
            }
        }

        let report = SurveyReport {
            stats,
            requested: refs::requested_patterns(&self.opts.refs),
            hash_hex_len: repo.object_hash().len_in_hex(),
            verbose: self.opts.verbose,
            name_rev: self.opts.name_rev,
            refs_wanted: self.opts.refs,
        };

        if telemetry.is_enabled() {
            crate::report::json::emit_sections(&report, &telemetry);
        }

        Ok(report)
    }

    /// Seed the revision walk from the classified refs and visit every
    /// reachable object. Seeds that peel to trees or blobs are surveyed
    /// after the commit walk, like any other pending object.
    fn walk_objects(
        &self,
        repo: &gix::Repository,
        records: &[RefRecord],
        stats: &mut SurveyStats,
        progress: &dyn ProgressReporter,
    ) -> Result<u64> {
        let odb = repo.objects.clone();
        let disk = DiskSizeIndex::load(repo);
        self.log(&format!(
            "Indexed disk sizes for {} packed objects",
            disk.len()
        ));

        let mut commit_seeds = Vec::new();
        let mut pending = Vec::new();
        let mut buf = Vec::new();
        for id in refs::walk_seeds(records) {
            match object_kind(&odb, &id, &mut buf) {
                Some(Kind::Commit) => commit_seeds.push(id),
                Some(kind @ (Kind::Tree | Kind::Blob)) => pending.push((id, kind)),
                // A tag that would not peel; tags are accounted for in
                // the ref stats, never in the object walk.
                Some(Kind::Tag) => {}
                None => bail!("revision walk setup failed: cannot read seed object {id}"),
            }
        }

        let mut walker = ObjectWalker::new(
            &odb,
            &disk,
            stats,
            progress.start_counter("Walking reachable objects"),
        );

        if !commit_seeds.is_empty() {
            let walk = repo
                .rev_walk(commit_seeds.iter().copied())
                .all()
                .context("revision walk setup failed")?;
            for info in walk {
                match info {
                    Ok(info) => walker.visit_commit(info.id, info.parent_ids.len()),
                    Err(e) => {
                        eprintln!("Warning: revision walk stopped early: {e}");
                        break;
                    }
                }
            }
        }

        for (id, kind) in pending {
            walker.visit_detached_object(id, kind);
        }

        Ok(walker.finish())
    }

    fn log(&self, msg: &str) {
        if self.opts.verbose {
            eprintln!("{}", msg);
        }
    }
}
