use anyhow::Context;
use kguard_domain::TargetRef;
use kguard_engine::{Check, Results};
use kguard_types::{CheckReport, RunReport, SCHEMA_RUN_REPORT_V1, TargetReport};

/// Snapshot one check's results tree, rooted at `root`, into its report form.
///
/// Children keep the results tree's order (by target kind, then id).
pub fn build_check_report(check: &Check, root: &TargetRef, results: &Results) -> CheckReport {
    let root = target_report(root, results);
    CheckReport {
        check_id: check.id().to_string(),
        scope: check.scope(),
        data_dependencies: check.data_dependencies().to_vec(),
        interpretation: check.interpretation_text().to_string(),
        counts: root.counts(),
        root,
    }
}

fn target_report(target: &TargetRef, results: &Results) -> TargetReport {
    TargetReport {
        kind: target.kind,
        id: target.id.clone(),
        evidence: results.evidence(),
        error: results.error().map(|err| err.to_string()),
        children: results
            .children()
            .iter()
            .map(|(child_ref, child)| target_report(child_ref, child))
            .collect(),
    }
}

pub fn serialize_report(report: &RunReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize run report")
}

pub fn parse_report_json(text: &str) -> anyhow::Result<RunReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;
    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_RUN_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema}");
    }
    serde_json::from_value(value).context("parse run report")
}
