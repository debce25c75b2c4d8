//! One-shot broadcast value shared by every check of a run.

use crate::error::RunError;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// A cell written at most once. Every reader observes the same final value;
/// waiters block on a condvar until it is written.
///
/// `Err` means the run was cancelled or terminated. `Ok(())` is written by the
/// run itself once all checks have returned.
#[derive(Clone, Debug, Default)]
pub struct Signal {
    inner: Arc<SignalInner>,
}

#[derive(Debug, Default)]
struct SignalInner {
    value: Mutex<Option<Result<(), RunError>>>,
    ready: Condvar,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the value. Returns `false` if it was already written, in which
    /// case `value` is dropped.
    pub fn fire(&self, value: Result<(), RunError>) -> bool {
        let mut slot = self.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        drop(slot);
        self.inner.ready.notify_all();
        true
    }

    pub fn is_set(&self) -> bool {
        self.lock().is_some()
    }

    pub fn peek(&self) -> Option<Result<(), RunError>> {
        self.lock().clone()
    }

    /// The error, if the signal fired with one.
    pub fn cancellation(&self) -> Option<RunError> {
        match &*self.lock() {
            Some(Err(err)) => Some(err.clone()),
            _ => None,
        }
    }

    /// Block until the value is written, then return it.
    pub fn wait(&self) -> Result<(), RunError> {
        let guard = self.lock();
        let guard = self
            .inner
            .ready
            .wait_while(guard, |value| value.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        match &*guard {
            Some(value) => value.clone(),
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Result<(), RunError>>> {
        self.inner.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Caller-owned cancellation for one or more runs.
///
/// Cancelling the token writes `RunError::Cancelled` into the signal of every
/// run currently watching it. A run that starts watching an already-cancelled
/// token is cancelled immediately.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    inner: Arc<Mutex<TokenState>>,
}

#[derive(Debug, Default)]
struct TokenState {
    reason: Option<String>,
    next_watch: u64,
    watchers: Vec<(u64, Signal)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every watching run. Only the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        let (reason, watchers) = {
            let mut state = self.lock();
            if state.reason.is_some() {
                return;
            }
            let reason = reason.into();
            state.reason = Some(reason.clone());
            (reason, std::mem::take(&mut state.watchers))
        };
        debug!(%reason, watchers = watchers.len(), "cancellation requested");
        for (_, signal) in watchers {
            signal.fire(Err(RunError::Cancelled {
                reason: reason.clone(),
            }));
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().reason.is_some()
    }

    pub fn reason(&self) -> Option<String> {
        self.lock().reason.clone()
    }

    /// Forward this token's cancellation into `signal` until the returned
    /// guard is dropped.
    pub(crate) fn watch(&self, signal: &Signal) -> Watch {
        let mut state = self.lock();
        if let Some(reason) = state.reason.clone() {
            drop(state);
            signal.fire(Err(RunError::Cancelled { reason }));
            return Watch {
                token: self.clone(),
                id: None,
            };
        }
        let id = state.next_watch;
        state.next_watch += 1;
        state.watchers.push((id, signal.clone()));
        Watch {
            token: self.clone(),
            id: Some(id),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) struct Watch {
    token: CancelToken,
    id: Option<u64>,
}

impl Drop for Watch {
    fn drop(&mut self) {
        if let Some(id) = self.id {
            self.token.lock().watchers.retain(|(w, _)| *w != id);
        }
    }
}
