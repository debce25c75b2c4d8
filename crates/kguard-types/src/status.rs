use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verdict attached to a single piece of evidence.
///
/// There are exactly four statuses. `Skip` and `Note` never count as failures;
/// they exist so a check can say "not applicable here" or "informational"
/// without lying about a pass.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceStatus {
    Pass,
    Fail,
    Skip,
    Note,
}

impl EvidenceStatus {
    pub const ALL: [EvidenceStatus; 4] = [
        EvidenceStatus::Pass,
        EvidenceStatus::Fail,
        EvidenceStatus::Skip,
        EvidenceStatus::Note,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EvidenceStatus::Pass => "pass",
            EvidenceStatus::Fail => "fail",
            EvidenceStatus::Skip => "skip",
            EvidenceStatus::Note => "note",
        }
    }
}

impl fmt::Display for EvidenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
