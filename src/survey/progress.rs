//! Progress reporting abstraction
//!
//! Decouples the survey phases from UI concerns (indicatif). Publication
//! is best-effort and never affects correctness.

use indicatif::{ProgressBar, ProgressStyle};

/// A handle to an active progress display
pub trait ProgressHandle {
    fn inc(&self, n: u64);
    fn finish(&self);
}

/// Factory for creating progress handles
pub trait ProgressReporter {
    /// A bounded phase with a known total.
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle>;

    /// An unbounded phase; only the running count is shown.
    fn start_counter(&self, label: &str) -> Box<dyn ProgressHandle>;
}

/// Indicatif-based progress reporter for terminal usage
pub struct IndicatifProgress;

impl ProgressReporter for IndicatifProgress {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle> {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} {}: [{{bar:50.cyan/blue}}] {{pos}}/{{len}} ({{per_sec}})",
                    label
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Box::new(IndicatifHandle(pb))
    }

    fn start_counter(&self, label: &str) -> Box<dyn ProgressHandle> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template(&format!("{{spinner:.green}} {}: {{pos}} ({{per_sec}})", label))
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Box::new(IndicatifHandle(pb))
    }
}

struct IndicatifHandle(ProgressBar);

impl ProgressHandle for IndicatifHandle {
    fn inc(&self, n: u64) {
        self.0.inc(n);
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}

/// No-op progress reporter for quiet mode and tests
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _label: &str, _total: u64) -> Box<dyn ProgressHandle> {
        Box::new(NoopHandle)
    }

    fn start_counter(&self, _label: &str) -> Box<dyn ProgressHandle> {
        Box::new(NoopHandle)
    }
}

struct NoopHandle;

impl ProgressHandle for NoopHandle {
    fn inc(&self, _n: u64) {}
    fn finish(&self) {}
}
