//! Stable DTOs and vocabulary used across the kguard workspace.
//!
//! This crate is intentionally boring:
//! - the four evidence statuses
//! - the kinds of target a check can be scoped to
//! - the serializable run report emitted by the application layer

#![forbid(unsafe_code)]

pub mod kind;
pub mod report;
pub mod status;

pub use kind::{TargetKind, UnknownTargetKind};
pub use report::{
    CheckReport, EvidenceRecord, RunOutcome, RunReport, StatusCounts, TargetReport, ToolMeta,
    SCHEMA_RUN_REPORT_V1,
};
pub use status::EvidenceStatus;
