//! Filesystem edges: inventory snapshots and scraped data in, reports out.

use anyhow::Context;
use camino::Utf8Path;
use kguard_domain::{Domain, DomainSnapshot, StaticDataRepository};
use kguard_types::RunReport;

use crate::report::serialize_report;

/// Read a JSON [`DomainSnapshot`] and build the immutable [`Domain`] from it.
pub fn load_snapshot(path: &Utf8Path) -> anyhow::Result<Domain> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read snapshot {path}"))?;
    let snapshot: DomainSnapshot =
        serde_json::from_str(&text).with_context(|| format!("parse snapshot {path}"))?;
    Ok(Domain::from(snapshot))
}

/// Read scraped cluster, host and dataset payloads from a JSON file.
pub fn load_data(path: &Utf8Path) -> anyhow::Result<StaticDataRepository> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read data {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parse data {path}"))
}

pub fn write_report(path: &Utf8Path, report: &RunReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    let bytes = serialize_report(report)?;
    std::fs::write(path, bytes).with_context(|| format!("write report {path}"))
}
