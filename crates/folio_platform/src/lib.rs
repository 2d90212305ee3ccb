//! Folio Platform Layer
//!
//! Headless stand-ins for the platform services the card transitions consume:
//! touch input, pan gesture recognition and screen lifecycle hooks.
//!
//! # Features
//!
//! - **Touch Input**: [`TouchEvent`] in screen coordinates
//! - **Pan Recognizers**: vertical and screen-edge pans with enable flags and
//!   failure requirements between competing recognizers
//! - **Lifecycle Hooks**: [`ScreenLifecycle`] overridden by screen types

mod error;
mod gesture;
mod input;
mod lifecycle;

// Re-export all public types
pub use error::{PlatformError, Result};
pub use gesture::{PanRecognizer, DEFAULT_EDGE_MARGIN};
pub use input::{GesturePhase, PanEvent, RecognizerKind, TouchEvent};
pub use lifecycle::{LifecycleEvent, ScreenLifecycle};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::gesture::PanRecognizer;
    pub use crate::input::{GesturePhase, PanEvent, RecognizerKind, TouchEvent};
    pub use crate::lifecycle::{LifecycleEvent, ScreenLifecycle};
}
