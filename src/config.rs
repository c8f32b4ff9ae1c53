//! Survey options
//!
//! Options come from three layers: built-in defaults, `survey.*` keys in
//! the repository configuration, and command-line flags (strongest).
//! Ref selection is command-line only and deliberately tri-state: a flag
//! that was never mentioned is not the same as one turned off.

use std::io::IsTerminal;

use crate::cli::Cli;
use crate::stats::LargeVecCaps;

/// Capacity of each "largest n" dimension unless configured otherwise.
pub const DEFAULT_SHOW_LARGEST: usize = 10;

/// Raw ref-selection flags as given on the command line. `None` means
/// the flag was never mentioned.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefSelection {
    pub all: Option<bool>,
    pub branches: Option<bool>,
    pub tags: Option<bool>,
    pub remotes: Option<bool>,
    pub detached: Option<bool>,
    pub other: Option<bool>,
}

/// The resolved ref selection the engine works from.
#[derive(Debug, Clone, Copy)]
pub struct RefsWanted {
    pub all: bool,
    pub branches: bool,
    pub tags: bool,
    pub remotes: bool,
    pub detached: bool,
    pub other: bool,
}

impl RefSelection {
    pub fn from_cli(cli: &Cli) -> Self {
        let flag = |given: bool| given.then_some(true);
        Self {
            all: flag(cli.all_refs),
            branches: flag(cli.branches),
            tags: flag(cli.tags),
            remotes: flag(cli.remotes),
            detached: flag(cli.detached),
            other: flag(cli.other),
        }
    }

    /// Resolve the tri-state flags: `--all-refs` wants everything; no
    /// selection at all falls back to the built-in default of branches,
    /// tags and remotes; any explicit selection wants exactly what it
    /// names.
    pub fn resolve(&self) -> RefsWanted {
        if self.all == Some(true) {
            return RefsWanted {
                all: true,
                branches: true,
                tags: true,
                remotes: true,
                detached: true,
                other: true,
            };
        }

        if self.branches.is_none()
            && self.tags.is_none()
            && self.remotes.is_none()
            && self.detached.is_none()
            && self.other.is_none()
        {
            return RefsWanted {
                all: false,
                branches: true,
                tags: true,
                remotes: true,
                detached: false,
                other: false,
            };
        }

        RefsWanted {
            all: false,
            branches: self.branches.unwrap_or(false),
            tags: self.tags.unwrap_or(false),
            remotes: self.remotes.unwrap_or(false),
            detached: self.detached.unwrap_or(false),
            other: self.other.unwrap_or(false),
        }
    }
}

/// Fully resolved engine options.
#[derive(Debug, Clone)]
pub struct Options {
    pub verbose: bool,
    pub progress: bool,
    pub json: bool,
    pub name_rev: bool,

    pub show_commit_parents: usize,
    pub show_commit_sizes: usize,
    pub show_tree_entries: usize,
    pub show_tree_sizes: usize,
    pub show_blob_sizes: usize,

    pub refs: RefsWanted,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verbose: false,
            progress: false,
            json: false,
            name_rev: true,
            show_commit_parents: DEFAULT_SHOW_LARGEST,
            show_commit_sizes: DEFAULT_SHOW_LARGEST,
            show_tree_entries: DEFAULT_SHOW_LARGEST,
            show_tree_sizes: DEFAULT_SHOW_LARGEST,
            show_blob_sizes: DEFAULT_SHOW_LARGEST,
            refs: RefSelection::default().resolve(),
        }
    }
}

impl Options {
    pub fn large_caps(&self) -> LargeVecCaps {
        LargeVecCaps {
            commit_parents: self.show_commit_parents,
            commit_sizes: self.show_commit_sizes,
            tree_entries: self.show_tree_entries,
            tree_sizes: self.show_tree_sizes,
            blob_sizes: self.show_blob_sizes,
        }
    }
}

/// Merge repository configuration and command line into final options.
pub fn load(repo: &gix::Repository, cli: &Cli) -> Options {
    let config = repo.config_snapshot();
    let boolean = |key: &str| config.boolean(key);
    let capacity = |key: &str| {
        config
            .integer(key)
            .and_then(|v| usize::try_from(v).ok())
    };

    Options {
        verbose: cli.verbose || boolean("survey.verbose").unwrap_or(false),
        progress: cli.progress
            || boolean("survey.progress").unwrap_or_else(|| std::io::stderr().is_terminal()),
        json: cli.json || boolean("survey.json").unwrap_or(false),
        name_rev: cli.name_rev || boolean("survey.namerev").unwrap_or(true),

        show_commit_parents: cli
            .commit_parents
            .or_else(|| capacity("survey.showcommitparents"))
            .unwrap_or(DEFAULT_SHOW_LARGEST),
        show_commit_sizes: cli
            .commit_sizes
            .or_else(|| capacity("survey.showcommitsizes"))
            .unwrap_or(DEFAULT_SHOW_LARGEST),
        show_tree_entries: cli
            .tree_entries
            .or_else(|| capacity("survey.showtreeentries"))
            .unwrap_or(DEFAULT_SHOW_LARGEST),
        show_tree_sizes: cli
            .tree_sizes
            .or_else(|| capacity("survey.showtreesizes"))
            .unwrap_or(DEFAULT_SHOW_LARGEST),
        show_blob_sizes: cli
            .blob_sizes
            .or_else(|| capacity("survey.showblobsizes"))
            .unwrap_or(DEFAULT_SHOW_LARGEST),

        refs: RefSelection::from_cli(cli).resolve(),
    }
}
