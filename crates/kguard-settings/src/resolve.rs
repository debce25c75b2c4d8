use crate::{model::KguardConfigV1, presets::Profile};
use anyhow::Context;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;

pub const DEFAULT_STANDARD: &str = "default";

#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub standard: Option<String>,
    pub profile: Option<String>,
}

/// The resolved answer to "which registered checks does this run execute".
#[derive(Clone, Debug)]
pub struct RunSelection {
    pub standard: String,
    pub profile: Profile,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    enabled: BTreeMap<String, bool>,
}

impl RunSelection {
    /// Per-check `enabled` wins. Otherwise the check must be included
    /// (by pattern, or by an `all` profile when there are no patterns) and not excluded.
    pub fn is_selected(&self, check_id: &str) -> bool {
        if let Some(enabled) = self.enabled.get(check_id) {
            return *enabled;
        }
        let included = match &self.include {
            Some(set) => set.is_match(check_id),
            None => self.profile.selects_by_default(),
        };
        let excluded = self
            .exclude
            .as_ref()
            .is_some_and(|set| set.is_match(check_id));
        included && !excluded
    }

    /// Filter `ids` down to the selected ones, preserving order.
    pub fn select<'a, I>(&self, ids: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter().filter(|id| self.is_selected(id)).collect()
    }
}

pub fn resolve_config(cfg: KguardConfigV1, overrides: Overrides) -> anyhow::Result<RunSelection> {
    let profile = match overrides.profile.or(cfg.profile) {
        Some(p) => Profile::parse(&p)?,
        None => Profile::default(),
    };

    let standard = overrides
        .standard
        .or(cfg.standard)
        .unwrap_or_else(|| DEFAULT_STANDARD.to_string());
    if standard.trim().is_empty() {
        anyhow::bail!("standard name must not be empty");
    }

    let include = build_globset("include", &cfg.include)?;
    let exclude = build_globset("exclude", &cfg.exclude)?;

    let enabled = cfg
        .checks
        .into_iter()
        .filter_map(|(id, cc)| cc.enabled.map(|e| (id, e)))
        .collect();

    Ok(RunSelection {
        standard,
        profile,
        include,
        exclude,
        enabled,
    })
}

fn build_globset(field: &str, patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("invalid {field} glob: {pattern}"))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .with_context(|| format!("failed to build {field} globs"))?;
    Ok(Some(set))
}
