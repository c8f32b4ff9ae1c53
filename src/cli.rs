use clap::Parser;
use std::path::PathBuf;

/// All boolean flags are positive-only: mentioning one turns the thing
/// on, and ref-selection flags additionally mark themselves as
/// "explicitly chosen" (see `config::RefSelection`).
#[derive(Parser, Debug)]
#[command(name = "reposurvey", about = "Survey the scale and shape of a git repository")]
pub struct Cli {
    /// Path to the git repository
    #[arg(default_value = ".")]
    pub repo_path: PathBuf,

    /// Verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Show progress (default: stderr is a terminal)
    #[arg(long)]
    pub progress: bool,

    /// Report stats as JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Resolve a symbolic name for each reported commit (default: on)
    #[arg(long = "name-rev")]
    pub name_rev: bool,

    /// Include all refs
    #[arg(long = "all-refs")]
    pub all_refs: bool,

    /// Include branches
    #[arg(long)]
    pub branches: bool,

    /// Include tags
    #[arg(long)]
    pub tags: bool,

    /// Include remote-tracking refs
    #[arg(long)]
    pub remotes: bool,

    /// Include a detached HEAD
    #[arg(long)]
    pub detached: bool,

    /// Include notes and stashes
    #[arg(long)]
    pub other: bool,

    /// Show N largest commits by parent count
    #[arg(long = "commit-parents", value_name = "N")]
    pub commit_parents: Option<usize>,

    /// Show N largest commits by size in bytes
    #[arg(long = "commit-sizes", value_name = "N")]
    pub commit_sizes: Option<usize>,

    /// Show N largest trees by entry count
    #[arg(long = "tree-entries", value_name = "N")]
    pub tree_entries: Option<usize>,

    /// Show N largest trees by size in bytes
    #[arg(long = "tree-sizes", value_name = "N")]
    pub tree_sizes: Option<usize>,

    /// Show N largest blobs by size in bytes
    #[arg(long = "blob-sizes", value_name = "N")]
    pub blob_sizes: Option<usize>,
}
