use crate::{EvidenceStatus, TargetKind};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for kguard run reports.
pub const SCHEMA_RUN_REPORT_V1: &str = "kguard.run_report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

/// One `(status, message)` pair recorded against a target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceRecord {
    pub status: EvidenceStatus,
    pub message: String,
}

impl EvidenceRecord {
    pub fn new(status: EvidenceStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatusCounts {
    pub pass: u32,
    pub fail: u32,
    pub skip: u32,
    pub note: u32,
    /// Number of targets (including the check root) that ended with a terminal error.
    pub errors: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: EvidenceStatus) {
        match status {
            EvidenceStatus::Pass => self.pass += 1,
            EvidenceStatus::Fail => self.fail += 1,
            EvidenceStatus::Skip => self.skip += 1,
            EvidenceStatus::Note => self.note += 1,
        }
    }

    pub fn merge(&mut self, other: &StatusCounts) {
        self.pass += other.pass;
        self.fail += other.fail;
        self.skip += other.skip;
        self.note += other.note;
        self.errors += other.errors;
    }

    pub fn evidence_total(&self) -> u32 {
        self.pass + self.fail + self.skip + self.note
    }

    /// A check "failed" if anything recorded a failure or ended in error.
    pub fn has_failures(&self) -> bool {
        self.fail > 0 || self.errors > 0
    }
}

/// The evidence trail for one target within one check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TargetReport {
    pub kind: TargetKind,
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<EvidenceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TargetReport>,
}

impl TargetReport {
    /// Counts for this target and everything below it.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for record in &self.evidence {
            counts.record(record.status);
        }
        if self.error.is_some() {
            counts.errors += 1;
        }
        for child in &self.children {
            counts.merge(&child.counts());
        }
        counts
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CheckReport {
    pub check_id: String,
    pub scope: TargetKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub interpretation: String,
    pub counts: StatusCounts,
    pub root: TargetReport,
}

/// How the run as a whole ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Cancelled { reason: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    /// Versioned schema identifier for the report shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub standard: String,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
    pub duration_ms: u64,
    pub outcome: RunOutcome,
    pub counts: StatusCounts,
    pub checks: Vec<CheckReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: TargetKind, id: &str, evidence: Vec<EvidenceRecord>) -> TargetReport {
        TargetReport {
            kind,
            id: id.to_string(),
            evidence,
            error: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn counts_include_children_and_errors() {
        let mut failing = leaf(
            TargetKind::Node,
            "n2",
            vec![EvidenceRecord::new(EvidenceStatus::Fail, "bad kernel")],
        );
        failing.error = Some("scrape missing".to_string());

        let root = TargetReport {
            kind: TargetKind::Cluster,
            id: "c".to_string(),
            evidence: vec![EvidenceRecord::new(EvidenceStatus::Note, "two nodes")],
            error: None,
            children: vec![
                leaf(
                    TargetKind::Node,
                    "n1",
                    vec![EvidenceRecord::new(EvidenceStatus::Pass, "ok")],
                ),
                failing,
            ],
        };

        let counts = root.counts();
        assert_eq!(counts.pass, 1);
        assert_eq!(counts.fail, 1);
        assert_eq!(counts.note, 1);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.evidence_total(), 3);
        assert!(counts.has_failures());
    }

    #[test]
    fn empty_collections_are_omitted() {
        let json = serde_json::to_value(leaf(TargetKind::Cluster, "c", Vec::new())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "cluster", "id": "c"}));
    }

    #[test]
    fn outcome_is_internally_tagged() {
        let json = serde_json::to_value(RunOutcome::Cancelled {
            reason: "deadline".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "cancelled", "reason": "deadline"})
        );
    }
}
