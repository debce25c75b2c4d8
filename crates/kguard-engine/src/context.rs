use crate::error::CheckError;
use crate::flow::{Flow, Stop};
use crate::results::{Results, ResultsNode};
use crate::signal::Signal;
use kguard_domain::{DataRepository, Domain, Target, TargetRef};
use kguard_types::EvidenceStatus;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Handle a check body works through, bound to exactly one target.
///
/// Domain, data and the run signal are shared with every other context of
/// the run; the target and results node belong to this context alone. Every
/// accessor first polls the run signal and returns `Err(Stop)` once it has
/// fired with an error.
pub struct Context {
    domain: Arc<Domain>,
    data: Arc<dyn DataRepository>,
    target: Target,
    results: Arc<ResultsNode>,
    signal: Signal,
    check_id: Arc<str>,
    standard: Arc<str>,
}

impl Context {
    pub(crate) fn root(
        domain: Arc<Domain>,
        data: Arc<dyn DataRepository>,
        results: Arc<ResultsNode>,
        signal: Signal,
        check_id: Arc<str>,
        standard: Arc<str>,
    ) -> Self {
        let target = domain.cluster().clone();
        Self {
            domain,
            data,
            target,
            results,
            signal,
            check_id,
            standard,
        }
    }

    fn ensure_live(&self) -> Flow {
        match self.signal.cancellation() {
            Some(err) => Err(Stop::Abort(CheckError::Cancelled(err))),
            None => Ok(()),
        }
    }

    pub fn domain(&self) -> Flow<&Domain> {
        self.ensure_live()?;
        Ok(&self.domain)
    }

    pub fn data(&self) -> Flow<&dyn DataRepository> {
        self.ensure_live()?;
        Ok(&*self.data)
    }

    pub fn target(&self) -> Flow<&Target> {
        self.ensure_live()?;
        Ok(&self.target)
    }

    /// A fresh child context for `target`, sharing domain, data and signal,
    /// writing into the child results node keyed by the target's identity.
    pub fn for_object(&self, target: Target) -> Flow<Context> {
        self.ensure_live()?;
        let results = self.results.child(target.to_ref());
        Ok(Context {
            domain: self.domain.clone(),
            data: self.data.clone(),
            target,
            results,
            signal: self.signal.clone(),
            check_id: self.check_id.clone(),
            standard: self.standard.clone(),
        })
    }

    pub fn record_evidence(&self, status: EvidenceStatus, message: impl Into<String>) -> Flow {
        self.ensure_live()?;
        self.results.record(status, message.into());
        Ok(())
    }

    /// Record the terminal error of this target. `None` leaves the node as is;
    /// a second error is ignored.
    pub fn finalize(&self, error: Option<CheckError>) {
        if let Some(err) = error {
            self.results.set_error(err);
        }
    }

    /// Scraped host data for the node this context is bound to.
    ///
    /// Aborts the target if nothing was scraped for it.
    ///
    /// # Panics
    ///
    /// Panics if the context is not bound to a node.
    pub fn host_data(&self) -> Flow<&Value> {
        let node = self.target()?.node();
        match self.data()?.host_data(&node.name) {
            Some(value) => Ok(value),
            None => Err(Stop::abort(format!(
                "no host data was scraped for node {}",
                node.name
            ))),
        }
    }

    /// A named dataset. Aborts the target if the repository does not have it.
    pub fn dataset(&self, tag: &str) -> Flow<&Value> {
        match self.data()?.dataset(tag) {
            Some(value) => Ok(value),
            None => Err(Stop::abort(format!("dataset {tag} is not available"))),
        }
    }

    /// Read-only view of this context's results node.
    pub fn results(&self) -> Results {
        Results::new(self.results.clone())
    }

    /// Identity of the bound target. Does not poll the run signal.
    pub fn target_ref(&self) -> TargetRef {
        self.target.to_ref()
    }

    pub fn check_id(&self) -> &str {
        &self.check_id
    }

    pub fn standard(&self) -> &str {
        &self.standard
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("check_id", &self.check_id)
            .field("standard", &self.standard)
            .field("target", &self.target.to_ref())
            .finish_non_exhaustive()
    }
}
