//! Run orchestration: one thread per check, a single join barrier, and a
//! shared one-shot signal for completion and cancellation.

use crate::check::Check;
use crate::context::Context;
use crate::error::RunError;
use crate::results::{Results, ResultsNode};
use crate::scope::execute;
use crate::signal::{CancelToken, Signal};
use kguard_domain::{DataRepository, Domain};
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

struct Entry {
    check: Arc<Check>,
    root: Arc<ResultsNode>,
}

/// A single execution of a fixed list of checks.
///
/// `Run` is `Sync`: [`Run::terminate`], [`Run::wait`] and the results
/// accessors may be called from other threads while [`Run::run`] is in
/// progress.
pub struct Run {
    entries: Vec<Entry>,
    signal: Signal,
    started: AtomicBool,
}

impl Run {
    /// Prepare a run. Each check gets its own, empty results root. A check id
    /// that appears twice is only run once.
    pub fn new(checks: impl IntoIterator<Item = Arc<Check>>) -> Self {
        let mut entries: Vec<Entry> = Vec::new();
        for check in checks {
            if entries.iter().any(|e| e.check.id() == check.id()) {
                warn!(check = check.id(), "duplicate check in run; keeping the first");
                continue;
            }
            entries.push(Entry {
                check,
                root: ResultsNode::new(),
            });
        }
        Self {
            entries,
            signal: Signal::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Execute every check concurrently and wait for all of them.
    ///
    /// Returns `Ok(())` if the run completed, or the cancellation/termination
    /// error if the signal fired first. Checks observe cancellation on their
    /// next context access; a check that never touches its context again runs
    /// to completion regardless.
    ///
    /// A run executes at most once. Calling `run` again just waits for and
    /// returns the outcome of the first call.
    pub fn run(
        &self,
        cancel: &CancelToken,
        standard: &str,
        domain: Arc<Domain>,
        data: Arc<dyn DataRepository>,
    ) -> Result<(), RunError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.signal.wait();
        }
        if self.entries.is_empty() {
            debug!(standard, "no checks to run");
            self.signal.fire(Ok(()));
            return self.signal.wait();
        }

        let start = Instant::now();
        info!(standard, checks = self.entries.len(), "starting compliance run");

        let watch = cancel.watch(&self.signal);
        let standard: Arc<str> = Arc::from(standard);

        thread::scope(|s| {
            for entry in &self.entries {
                let check_id: Arc<str> = Arc::from(entry.check.id());
                let ctx = Context::root(
                    domain.clone(),
                    data.clone(),
                    entry.root.clone(),
                    self.signal.clone(),
                    check_id.clone(),
                    standard.clone(),
                );
                let check = &entry.check;
                let root = &entry.root;
                s.spawn(move || {
                    let _span = info_span!("check", check = %check_id).entered();
                    let started = Instant::now();
                    debug!(scope = %check.scope(), "check started");
                    execute(&ctx, |ctx| check.run(ctx));
                    let counts = Results::new(root.clone()).counts();
                    debug!(
                        evidence = counts.evidence_total(),
                        errors = counts.errors,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "check finished"
                    );
                });
            }
        });

        drop(watch);
        self.signal.fire(Ok(()));
        let outcome = self.signal.wait();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &outcome {
            Ok(()) => info!(standard = %standard, elapsed_ms, "compliance run completed"),
            Err(err) => warn!(standard = %standard, elapsed_ms, error = %err, "compliance run did not complete"),
        }
        outcome
    }

    /// Block until the run has an outcome. Never triggers anything itself.
    pub fn wait(&self) -> Result<(), RunError> {
        self.signal.wait()
    }

    /// Force the run to stop. The first call (or cancellation) wins; returns
    /// whether this call was the one that stopped the run.
    pub fn terminate(&self, err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> bool {
        let err = RunError::terminated(err);
        let message = err.to_string();
        let fired = self.signal.fire(Err(err));
        if fired {
            warn!(error = %message, "terminating compliance run");
        }
        fired
    }

    /// Results of every check, keyed by check id.
    pub fn results(&self) -> BTreeMap<String, Results> {
        self.entries
            .iter()
            .map(|e| (e.check.id().to_string(), Results::new(e.root.clone())))
            .collect()
    }

    pub fn result(&self, check_id: &str) -> Option<Results> {
        self.entries
            .iter()
            .find(|e| e.check.id() == check_id)
            .map(|e| Results::new(e.root.clone()))
    }

    /// The checks of this run, keyed by check id.
    pub fn checks(&self) -> BTreeMap<String, Arc<Check>> {
        self.entries
            .iter()
            .map(|e| (e.check.id().to_string(), e.check.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
