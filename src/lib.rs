// Library crate exposing modules for integration tests and benches

pub mod cli;
pub mod config;
pub mod report;
pub mod stats;
pub mod survey;
pub mod telemetry;
