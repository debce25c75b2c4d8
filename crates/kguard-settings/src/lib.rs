//! Config parsing and check selection.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;

pub use model::{CheckConfig, KguardConfigV1, SCHEMA_CONFIG_V1};
pub use presets::Profile;
pub use resolve::{DEFAULT_STANDARD, Overrides, RunSelection};

/// Parse `kguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<KguardConfigV1> {
    let cfg: KguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve which checks a run executes, and under which standard name.
pub fn resolve_config(cfg: KguardConfigV1, overrides: Overrides) -> anyhow::Result<RunSelection> {
    resolve::resolve_config(cfg, overrides)
}

/// JSON schema of the config file, for editor tooling.
pub fn config_schema() -> serde_json::Value {
    schemars::schema_for!(KguardConfigV1).to_value()
}
