use std::error::Error as StdError;
use std::sync::Arc;

/// An arbitrary error shared between results nodes, signals and callers.
pub type SharedError = Arc<dyn StdError + Send + Sync + 'static>;

/// Terminal error recorded on one results node.
#[derive(Clone, Debug, thiserror::Error)]
pub enum CheckError {
    /// The check gave up on this target, typically over missing or malformed data.
    #[error("{0}")]
    Aborted(SharedError),

    /// The run was cancelled while this target was being evaluated.
    #[error("run cancelled during evaluation: {0}")]
    Cancelled(#[source] RunError),

    /// The body panicked. This is always a bug in the check.
    #[error("check panicked (implementation bug): {message}")]
    Panicked { message: String },
}

impl CheckError {
    pub fn aborted(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        CheckError::Aborted(Arc::from(err.into()))
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, CheckError::Cancelled(_))
    }

    pub fn is_implementation_bug(&self) -> bool {
        matches!(self, CheckError::Panicked { .. })
    }
}

/// Why a run ended without completing normally.
#[derive(Clone, Debug, thiserror::Error)]
pub enum RunError {
    /// The caller's cancellation token fired.
    #[error("run cancelled: {reason}")]
    Cancelled { reason: String },

    /// [`crate::Run::terminate`] was called.
    #[error("run terminated: {source}")]
    Terminated { source: SharedError },
}

impl RunError {
    pub fn terminated(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        RunError::Terminated {
            source: Arc::from(err.into()),
        }
    }
}

/// Two run errors are equal when they are the same cancellation: the same
/// reason, or the very same termination cause.
impl PartialEq for RunError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RunError::Cancelled { reason: a }, RunError::Cancelled { reason: b }) => a == b,
            (RunError::Terminated { source: a }, RunError::Terminated { source: b }) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("check {0} is already registered")]
    Duplicate(String),

    #[error("check id must not be empty")]
    EmptyId,
}
