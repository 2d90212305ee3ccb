//! Transition error types

use folio_animation::AnimationError;
use folio_core::ViewTreeError;
use folio_platform::PlatformError;
use thiserror::Error;

use crate::context::TransitionDirection;

/// Errors raised while setting up or driving a card transition
#[derive(Error, Debug)]
pub enum TransitionError {
    #[error(transparent)]
    View(#[from] ViewTreeError),

    #[error(transparent)]
    Animation(#[from] AnimationError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A config value is out of range
    #[error("Invalid transition config: {0}")]
    Config(String),

    #[error("Failed to parse transition config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize transition config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("Failed to read transition config: {0}")]
    Io(#[from] std::io::Error),

    /// Only one transition may run at a time
    #[error("A {0:?} transition is already in flight")]
    AlreadyInFlight(TransitionDirection),
}

/// Result type for transition operations
pub type Result<T> = std::result::Result<T, TransitionError>;
