//! Platform error types

use thiserror::Error;

/// Platform-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// A move or end arrived for a touch the recognizer never saw start
    #[error("Touch {0} was never started")]
    TouchNotStarted(u64),

    /// A recognizer was asked to wait for its own failure
    #[error("A recognizer cannot require its own failure")]
    SelfFailureRequirement,
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
