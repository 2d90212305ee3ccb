//! Animation error types

use folio_core::ViewTreeError;
use thiserror::Error;

use crate::scheduler::AnimatorState;

/// Errors raised when driving property animators
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// The scheduler that owned the animator is gone
    #[error("Animation scheduler has been dropped")]
    SchedulerDropped,

    /// The operation is not allowed in the animator's current state
    #[error("Cannot {op} an animator in state {state:?}")]
    InvalidState {
        op: &'static str,
        state: AnimatorState,
    },

    /// Reading a starting value from the view tree failed
    #[error(transparent)]
    View(#[from] ViewTreeError),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
