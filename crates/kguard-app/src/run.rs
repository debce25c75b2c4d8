//! The `run` use case: evaluate the selected checks of a standard and produce a report.

use anyhow::Context;
use kguard_domain::{DataRepository, Domain};
use kguard_engine::{CancelToken, Registry, Run, RunError};
use kguard_settings::{KguardConfigV1, Overrides, RunSelection};
use kguard_types::{
    CheckReport, RunOutcome, RunReport, SCHEMA_RUN_REPORT_V1, StatusCounts, ToolMeta,
};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::report::build_check_report;

/// Input for the run use case.
pub struct RunInput<'a> {
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// Caller overrides, applied on top of the config file.
    pub overrides: Overrides,
    /// Where checks are selected from.
    pub registry: &'a Registry,
    pub domain: Arc<Domain>,
    pub data: Arc<dyn DataRepository>,
    /// Cancelling this token stops the run cooperatively.
    pub cancel: &'a CancelToken,
}

/// Output from the run use case.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub report: RunReport,
    /// The resolved selection the run used.
    pub selection: RunSelection,
}

/// Parse config, select checks, run them to completion or cancellation, produce a report.
///
/// A cancelled or terminated run is still a successful use case: the report
/// carries the outcome and whatever evidence was recorded before the stop.
pub fn run_standard(input: RunInput<'_>) -> anyhow::Result<RunOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Empty config is allowed, defaults apply.
    let cfg = if input.config_text.trim().is_empty() {
        KguardConfigV1::default()
    } else {
        kguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };
    let selection =
        kguard_settings::resolve_config(cfg, input.overrides).context("resolve config")?;

    let checks: Vec<_> = input
        .registry
        .all()
        .into_iter()
        .filter(|check| selection.is_selected(check.id()))
        .collect();
    if checks.is_empty() {
        warn!(standard = %selection.standard, "no registered check is selected");
    }
    info!(
        standard = %selection.standard,
        profile = %selection.profile,
        selected = checks.len(),
        registered = input.registry.len(),
        "evaluating standard"
    );

    let run = Run::new(checks);
    let outcome = match run.run(
        input.cancel,
        &selection.standard,
        input.domain.clone(),
        input.data,
    ) {
        Ok(()) => RunOutcome::Completed,
        Err(RunError::Cancelled { reason }) => RunOutcome::Cancelled { reason },
        Err(err @ RunError::Terminated { .. }) => RunOutcome::Cancelled {
            reason: err.to_string(),
        },
    };

    let root = input.domain.cluster().to_ref();
    let definitions = run.checks();
    let checks: Vec<CheckReport> = run
        .results()
        .into_iter()
        .filter_map(|(id, results)| {
            definitions
                .get(&id)
                .map(|check| build_check_report(check, &root, &results))
        })
        .collect();

    let mut counts = StatusCounts::default();
    for check in &checks {
        counts.merge(&check.counts);
    }

    let finished_at = OffsetDateTime::now_utc();
    let duration_ms = (finished_at - started_at).whole_milliseconds().max(0) as u64;

    let report = RunReport {
        schema: SCHEMA_RUN_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: "kguard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        standard: selection.standard.clone(),
        started_at,
        finished_at,
        duration_ms,
        outcome,
        counts,
        checks,
    };

    Ok(RunOutput { report, selection })
}
