//! Folio Card Transitions
//!
//! Expands a tapped card into a full-screen detail screen on a spring and
//! lets the user drag the detail screen back into the card.
//!
//! # Features
//!
//! - **Card Snapshot**: on-screen card frames captured at tap time, with and
//!   without the highlight shrink
//! - **Presentation**: spring damping and duration derived from the card's
//!   distance to the top of the screen, with a linear expansion track
//! - **Dismissal**: spring back into the card frame while the content
//!   scrolls to the top
//! - **Drag to Dismiss**: a scrubbed proxy animator that commits past a
//!   threshold distance and reverses otherwise
//! - **Status Bar**: hidden with the transition, deferred while interactive
//! - **Configuration**: presets, builders and TOML files
//!
//! # Example
//!
//! ```ignore
//! use folio_transition::prelude::*;
//!
//! let mut transition = CardTransition::present_from_tap(
//!     tree.clone(),
//!     scheduler.handle(),
//!     TransitionConfig::standard(),
//!     list_screen,
//!     TapInfo { cell, content },
//! )?;
//! transition.begin(TransitionDirection::Present)?;
//!
//! // Each frame
//! scheduler.tick(1.0 / 60.0);
//! transition.poll()?;
//! ```

mod animator;
pub mod config;
mod context;
mod coordinator;
mod detail;
mod dismiss;
pub mod error;
mod present;
mod snapshot;
mod status_bar;

pub use animator::TransitionAnimator;
pub use config::{TransitionConfig, VerticalExpandingStyle};
pub use context::{ScreenViews, TransitionContext, TransitionDirection};
pub use coordinator::{CardTransition, TransitionOutcome};
pub use detail::{dismissal_progress, CardDetailScreen, DragToDismissDelegate, GestureTrackingState};
pub use dismiss::DismissCardAnimator;
pub use error::{Result, TransitionError};
pub use present::{PresentCardAnimator, SpringParameters};
pub use snapshot::{set_card_highlighted, CardContent, TapInfo, TransitionParams};
pub use status_bar::{
    StatusBarAnimatable, StatusBarAnimation, StatusBarConfig, StatusBarController,
    StatusBarUpdate,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{TransitionConfig, VerticalExpandingStyle};
    pub use crate::context::{ScreenViews, TransitionContext, TransitionDirection};
    pub use crate::coordinator::{CardTransition, TransitionOutcome};
    pub use crate::detail::{CardDetailScreen, DragToDismissDelegate};
    pub use crate::error::{Result, TransitionError};
    pub use crate::snapshot::{CardContent, TapInfo};
    pub use crate::status_bar::StatusBarAnimatable;
}
