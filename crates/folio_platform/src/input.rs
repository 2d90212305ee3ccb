//! Input event types for touch and pan gestures

use folio_core::Point;

// ============================================================================
// Touch Events
// ============================================================================

/// Touch events for touchscreens, in screen coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TouchEvent {
    /// A touch started
    Started {
        /// Unique identifier for this touch
        id: u64,
        location: Point,
    },
    /// A touch moved
    Moved { id: u64, location: Point },
    /// A touch ended
    Ended { id: u64, location: Point },
    /// A touch was cancelled (e.g., by system gesture)
    Cancelled { id: u64 },
}

impl TouchEvent {
    /// Get the touch ID
    pub fn id(&self) -> u64 {
        match self {
            TouchEvent::Started { id, .. } => *id,
            TouchEvent::Moved { id, .. } => *id,
            TouchEvent::Ended { id, .. } => *id,
            TouchEvent::Cancelled { id } => *id,
        }
    }

    /// Get the location (returns None for Cancelled)
    pub fn location(&self) -> Option<Point> {
        match self {
            TouchEvent::Started { location, .. }
            | TouchEvent::Moved { location, .. }
            | TouchEvent::Ended { location, .. } => Some(*location),
            TouchEvent::Cancelled { .. } => None,
        }
    }
}

// ============================================================================
// Pan Gestures
// ============================================================================

/// Phase of a continuous gesture
///
/// A recognized sequence always runs `Began → Changed* → Ended | Cancelled`.
/// `Possible` and `Failed` are recognizer-internal and never delivered to a
/// gesture handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    #[default]
    Possible,
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl GesturePhase {
    /// Began or Changed
    pub fn is_active(&self) -> bool {
        matches!(self, GesturePhase::Began | GesturePhase::Changed)
    }

    /// Ended or Cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(self, GesturePhase::Ended | GesturePhase::Cancelled)
    }
}

/// Which recognizer produced a pan event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecognizerKind {
    /// Free pan, used for vertical drag-down
    VerticalPan,
    /// Pan that must start at the left screen edge
    ScreenEdgePan,
}

/// One step of a pan gesture sequence
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanEvent {
    pub recognizer: RecognizerKind,
    pub phase: GesturePhase,
    /// Current touch location in screen coordinates
    pub location: Point,
    /// Translation since the sequence began
    pub translation: Point,
}

impl PanEvent {
    pub fn new(
        recognizer: RecognizerKind,
        phase: GesturePhase,
        location: Point,
        translation: Point,
    ) -> Self {
        Self {
            recognizer,
            phase,
            location,
            translation,
        }
    }
}
