//! Report assembly
//!
//! The frozen statistics record plus the few presentation inputs the
//! two output sinks need. Formatting lives in `json` and `pretty`;
//! both are mechanical projections of the same data.

pub mod json;
pub mod pretty;

use crate::config::RefsWanted;
use crate::stats::SurveyStats;

pub struct SurveyReport {
    pub stats: SurveyStats,
    /// Ref patterns that were handed to the ref store, echoed for
    /// reproducibility.
    pub requested: Vec<String>,
    /// Hex width of the repository's object hash, for table layout.
    pub hash_hex_len: usize,
    pub verbose: bool,
    /// Whether name-rev enrichment ran; controls the commit column.
    pub name_rev: bool,
    pub refs_wanted: RefsWanted,
}
