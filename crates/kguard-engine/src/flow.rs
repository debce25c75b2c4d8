//! Early exit for check bodies.
//!
//! A body and every helper it calls return [`Flow`]. `Err(Stop)` is not a
//! failure of the helper: it is the signal to abandon the rest of the body,
//! propagated with `?` through any number of helper frames until the finalize
//! boundary of [`Context::run_for_target`] (or of the run itself) absorbs it.

use crate::context::Context;
use crate::error::CheckError;
use kguard_types::EvidenceStatus;
use std::error::Error as StdError;

#[derive(Clone, Debug)]
pub enum Stop {
    /// Normal early exit: a verdict was recorded, nothing else to do here.
    Halt,
    /// Abnormal exit: recorded as the terminal error of the current target.
    Abort(CheckError),
}

pub type Flow<T = ()> = Result<T, Stop>;

impl Stop {
    pub fn abort(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Stop::Abort(CheckError::aborted(err))
    }
}

impl From<CheckError> for Stop {
    fn from(err: CheckError) -> Self {
        Stop::Abort(err)
    }
}

impl Context {
    pub fn pass(&self, message: impl Into<String>) -> Flow {
        self.record_evidence(EvidenceStatus::Pass, message)
    }

    pub fn fail(&self, message: impl Into<String>) -> Flow {
        self.record_evidence(EvidenceStatus::Fail, message)
    }

    pub fn skip(&self, message: impl Into<String>) -> Flow {
        self.record_evidence(EvidenceStatus::Skip, message)
    }

    pub fn note(&self, message: impl Into<String>) -> Flow {
        self.record_evidence(EvidenceStatus::Note, message)
    }

    /// Record a pass and stop evaluating this target.
    pub fn pass_now(&self, message: impl Into<String>) -> Flow {
        self.pass(message)?;
        Err(Stop::Halt)
    }

    /// Record a failure and stop evaluating this target.
    pub fn fail_now(&self, message: impl Into<String>) -> Flow {
        self.fail(message)?;
        Err(Stop::Halt)
    }

    pub fn skip_now(&self, message: impl Into<String>) -> Flow {
        self.skip(message)?;
        Err(Stop::Halt)
    }

    pub fn note_now(&self, message: impl Into<String>) -> Flow {
        self.note(message)?;
        Err(Stop::Halt)
    }

    /// Stop evaluating this target without recording anything.
    pub fn halt(&self) -> Flow {
        Err(Stop::Halt)
    }

    /// Stop evaluating this target and record `err` as its terminal error.
    pub fn abort(&self, err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Flow {
        Err(Stop::abort(err))
    }
}
