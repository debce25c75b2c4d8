//! Use case orchestration for kguard.
//!
//! This crate is the application layer: it resolves a run configuration,
//! picks checks out of a registry, drives the engine, and turns the results
//! tree into a serializable report. It is intentionally thin.

#![forbid(unsafe_code)]

mod io;
mod report;
mod run;

pub use io::{load_data, load_snapshot, write_report};
pub use report::{build_check_report, parse_report_json, serialize_report};
pub use run::{RunInput, RunOutput, run_standard};
