use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_CONFIG_V1: &str = "kguard.config.v1";

/// `kguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KguardConfigV1 {
    /// Optional schema string for tooling (`kguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Name of the standard this run evaluates (opaque to the engine).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,

    /// Starting selection: `all` (default) or `none`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Glob patterns over check ids. When non-empty, only matching checks are selected.
    #[serde(default)]
    pub include: Vec<String>,

    /// Glob patterns over check ids to leave out.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Map of check_id -> config. Wins over profile and patterns.
    #[serde(default)]
    pub checks: BTreeMap<String, CheckConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}
