//! View tree error types

use thiserror::Error;

use crate::tree::ViewId;

/// Errors raised by view tree operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewTreeError {
    /// The view id is not (or no longer) part of the tree
    #[error("Unknown view: {0:?}")]
    UnknownView(ViewId),

    /// Attaching the child would make it its own ancestor
    #[error("Cannot add {child:?} under {parent:?}: would create a cycle")]
    Cycle { parent: ViewId, child: ViewId },

    /// The view has no scroll metrics
    #[error("View is not scrollable: {0:?}")]
    NotScrollable(ViewId),

    /// The root view cannot be detached or destroyed
    #[error("The root view cannot be removed")]
    RootImmutable,
}

/// Result type for view tree operations
pub type Result<T> = std::result::Result<T, ViewTreeError>;
