use crate::context::Context;
use crate::flow::Flow;
use kguard_types::TargetKind;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// The body of a check: logic over a cluster-scoped [`Context`].
pub type CheckFn = dyn Fn(&Context) -> Flow + Send + Sync;

/// A named, scope-tagged unit of compliance logic.
///
/// The body is always invoked once, at cluster scope. A check declared at
/// `Node` or `Deployment` scope fans out itself via [`Context::for_each_node`]
/// and friends.
#[derive(Clone)]
pub struct Check {
    id: String,
    scope: TargetKind,
    additional_scopes: BTreeSet<TargetKind>,
    data_dependencies: Vec<String>,
    interpretation_text: String,
    body: Arc<CheckFn>,
}

impl Check {
    pub fn new<F>(id: impl Into<String>, scope: TargetKind, body: F) -> Self
    where
        F: Fn(&Context) -> Flow + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            scope,
            additional_scopes: BTreeSet::new(),
            data_dependencies: Vec::new(),
            interpretation_text: String::new(),
            body: Arc::new(body),
        }
    }

    pub fn with_additional_scopes(mut self, scopes: impl IntoIterator<Item = TargetKind>) -> Self {
        self.additional_scopes.extend(scopes);
        self.additional_scopes.remove(&self.scope);
        self
    }

    /// Opaque tags naming the data the body reads. Not validated.
    pub fn with_data_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_dependencies.extend(deps.into_iter().map(Into::into));
        self
    }

    pub fn with_interpretation(mut self, text: impl Into<String>) -> Self {
        self.interpretation_text = text.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scope(&self) -> TargetKind {
        self.scope
    }

    pub fn additional_scopes(&self) -> &BTreeSet<TargetKind> {
        &self.additional_scopes
    }

    pub fn data_dependencies(&self) -> &[String] {
        &self.data_dependencies
    }

    pub fn interpretation_text(&self) -> &str {
        &self.interpretation_text
    }

    pub fn applies_to(&self, kind: TargetKind) -> bool {
        self.scope == kind || self.additional_scopes.contains(&kind)
    }

    pub(crate) fn run(&self, ctx: &Context) -> Flow {
        (self.body)(ctx)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("additional_scopes", &self.additional_scopes)
            .field("data_dependencies", &self.data_dependencies)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_builders() {
        let check = Check::new("cis.4.2.1", TargetKind::Node, |_| Ok(()))
            .with_additional_scopes([TargetKind::Cluster, TargetKind::Node])
            .with_data_dependencies(["host_scraped", "kubelet_config"])
            .with_interpretation("Anonymous kubelet auth must be disabled.");

        assert_eq!(check.id(), "cis.4.2.1");
        assert_eq!(check.scope(), TargetKind::Node);
        // The primary scope is never duplicated as an additional one.
        assert_eq!(
            check.additional_scopes().iter().copied().collect::<Vec<_>>(),
            vec![TargetKind::Cluster]
        );
        assert_eq!(check.data_dependencies(), ["host_scraped", "kubelet_config"]);
        assert!(check.applies_to(TargetKind::Cluster));
        assert!(check.applies_to(TargetKind::Node));
        assert!(!check.applies_to(TargetKind::Deployment));
        assert!(format!("{check:?}").contains("cis.4.2.1"));
    }
}
