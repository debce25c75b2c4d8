use std::fmt;

/// Preset starting selections.
///
/// Keep these small and readable. Anything finer-grained goes into include/exclude patterns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// Every registered check, minus exclusions.
    #[default]
    All,
    /// Nothing, unless included by pattern or per-check config.
    None,
}

impl Profile {
    pub fn parse(v: &str) -> anyhow::Result<Self> {
        match v {
            "all" => Ok(Profile::All),
            "none" => Ok(Profile::None),
            other => anyhow::bail!("unknown profile: {other} (expected 'all' or 'none')"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Profile::All => "all",
            Profile::None => "none",
        }
    }

    pub(crate) fn selects_by_default(self) -> bool {
        matches!(self, Profile::All)
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
