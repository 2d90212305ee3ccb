//! Folio Animation
//!
//! Timing curves and a frame-ticked property animator runtime.
//!
//! # Features
//!
//! - **Spring Timing**: analytical damped springs parameterized by damping
//!   ratio and duration
//! - **Timing Curves**: linear, ease-in-out and spring, with nested tracks
//!   that finish early
//! - **Property Animators**: pausable, scrubbable, reversible animations of
//!   view properties with queued, exactly-once completions
//! - **Scheduler**: owns every live animator and writes values into the
//!   shared view tree on each tick

pub mod error;
pub mod scheduler;
pub mod spring;
pub mod timing;

pub use error::{AnimationError, Result};
pub use scheduler::{
    AnimatingPosition, AnimationScheduler, AnimatorId, AnimatorState, Completion,
    PropertyAnimator, SchedulerHandle,
};
pub use spring::spring_progress;
pub use timing::{TimingCurve, TrackTiming};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{AnimationError, Result};
    pub use crate::scheduler::{
        AnimatingPosition, AnimationScheduler, AnimatorState, PropertyAnimator, SchedulerHandle,
    };
    pub use crate::timing::{TimingCurve, TrackTiming};
}
