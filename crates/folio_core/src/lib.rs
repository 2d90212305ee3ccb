//! Folio Core
//!
//! Geometry primitives and the retained view tree that Folio's card
//! transitions animate.
//!
//! # Features
//!
//! - **Geometry**: `Point`, `Size` and `Rect` in screen points
//! - **View Tree**: slotmap-keyed hierarchy with frames, corner radius,
//!   uniform scale, visibility and scroll metrics
//! - **Coordinate Conversion**: presentation (scaled) and untransformed
//!   frames in screen space, used to snapshot a tapped card

pub mod error;
pub mod geometry;
pub mod tree;

pub use error::{Result, ViewTreeError};
pub use geometry::{Point, Rect, Size};
pub use tree::{ScrollMetrics, SharedViewTree, ViewId, ViewNode, ViewProperty, ViewTree};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Result, ViewTreeError};
    pub use crate::geometry::{Point, Rect, Size};
    pub use crate::tree::{ScrollMetrics, SharedViewTree, ViewId, ViewProperty, ViewTree};
}
