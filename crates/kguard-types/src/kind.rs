use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of object a check (or a piece of evidence) is scoped to.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Cluster,
    Node,
    Deployment,
    MachineConfig,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Cluster => "cluster",
            TargetKind::Node => "node",
            TargetKind::Deployment => "deployment",
            TargetKind::MachineConfig => "machine_config",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownTargetKind(pub String);

impl fmt::Display for UnknownTargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown target kind: {} (expected cluster|node|deployment|machine_config)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTargetKind {}

impl FromStr for TargetKind {
    type Err = UnknownTargetKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cluster" => Ok(TargetKind::Cluster),
            "node" => Ok(TargetKind::Node),
            "deployment" => Ok(TargetKind::Deployment),
            "machine_config" | "machineconfig" => Ok(TargetKind::MachineConfig),
            other => Err(UnknownTargetKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_form() {
        for kind in [
            TargetKind::Cluster,
            TargetKind::Node,
            TargetKind::Deployment,
            TargetKind::MachineConfig,
        ] {
            assert_eq!(kind.to_string().parse::<TargetKind>(), Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "pod".parse::<TargetKind>().unwrap_err();
        assert!(err.to_string().contains("pod"));
    }
}
