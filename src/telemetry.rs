//! Telemetry sink
//!
//! Tagged JSON lines at phase boundaries, plus the finished report
//! sections, for piping survey runs into external tooling. Enabled by
//! the `REPOSURVEY_TRACE` environment variable: `1`, `true` or `stderr`
//! write to stderr, anything else is treated as a file path to append
//! to. Emission is best-effort and never affects the survey itself.

use std::cell::RefCell;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Instant;

use serde_json::{json, Value};

pub const TRACE_ENV: &str = "REPOSURVEY_TRACE";

pub struct Telemetry {
    sink: Option<RefCell<Box<dyn Write>>>,
}

impl Telemetry {
    pub fn from_env() -> Self {
        let sink = match std::env::var(TRACE_ENV) {
            Ok(value) if value == "1" || value == "true" || value == "stderr" => {
                Some(Box::new(std::io::stderr()) as Box<dyn Write>)
            }
            Ok(path) if !path.is_empty() => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
                .map(|f| Box::new(f) as Box<dyn Write>),
            _ => None,
        };
        Self {
            sink: sink.map(RefCell::new),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Run one phase and report its wall-clock time.
    pub fn phase<T>(&self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        self.emit(json!({
            "event": "phase",
            "name": name,
            "elapsed_ms": start.elapsed().as_millis() as u64,
        }));
        result
    }

    /// Emit one finished report section.
    pub fn data(&self, section: &str, data: &Value) {
        self.emit(json!({
            "event": "data",
            "section": section,
            "data": data,
        }));
    }

    fn emit(&self, value: Value) {
        if let Some(sink) = &self.sink {
            let mut sink = sink.borrow_mut();
            let _ = writeln!(sink, "{}", value);
            let _ = sink.flush();
        }
    }
}
