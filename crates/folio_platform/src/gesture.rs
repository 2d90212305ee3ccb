//! Pan gesture recognizers
//!
//! A [`PanRecognizer`] turns raw [`TouchEvent`]s for a single touch into a
//! sequence of [`PanEvent`]s. Recognizers are cheap shared handles: clones
//! refer to the same recognizer, so an animation completion can re-enable a
//! recognizer that a gesture handler disabled.
//!
//! Failure requirements order competing recognizers. A recognizer that
//! requires another to fail will not begin while the other one is pending or
//! tracking. Feed each touch to the required recognizer first.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio_core::Point;

use crate::error::{PlatformError, Result};
use crate::input::{GesturePhase, PanEvent, RecognizerKind, TouchEvent};

/// Width of the strip along the left edge where an edge pan may start
pub const DEFAULT_EDGE_MARGIN: f32 = 20.0;

#[derive(Default)]
struct TrackingState {
    phase: GesturePhase,
    touch: Option<u64>,
    start: Point,
    last: Point,
    /// Touch whose remaining events are swallowed after a disable
    suppressed: Option<u64>,
}

impl TrackingState {
    fn reset(&mut self) {
        self.phase = GesturePhase::Possible;
        self.touch = None;
    }
}

struct RecognizerInner {
    kind: RecognizerKind,
    edge_margin: f32,
    enabled: Cell<bool>,
    state: RefCell<TrackingState>,
    requires_failure_of: RefCell<Vec<PanRecognizer>>,
}

/// Shared handle to a pan gesture recognizer
#[derive(Clone)]
pub struct PanRecognizer {
    inner: Rc<RecognizerInner>,
}

impl std::fmt::Debug for PanRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanRecognizer")
            .field("kind", &self.inner.kind)
            .field("enabled", &self.is_enabled())
            .field("phase", &self.phase())
            .finish()
    }
}

impl PanRecognizer {
    pub fn new(kind: RecognizerKind) -> Self {
        Self::with_edge_margin(kind, DEFAULT_EDGE_MARGIN)
    }

    /// Create a recognizer with a custom edge strip width (edge pans only)
    pub fn with_edge_margin(kind: RecognizerKind, edge_margin: f32) -> Self {
        Self {
            inner: Rc::new(RecognizerInner {
                kind,
                edge_margin,
                enabled: Cell::new(true),
                state: RefCell::new(TrackingState::default()),
                requires_failure_of: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn vertical() -> Self {
        Self::new(RecognizerKind::VerticalPan)
    }

    pub fn screen_edge() -> Self {
        Self::new(RecognizerKind::ScreenEdgePan)
    }

    pub fn kind(&self) -> RecognizerKind {
        self.inner.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Enable or disable recognition
    ///
    /// Disabling drops any in-flight sequence without emitting further
    /// events; the rest of that touch is ignored.
    pub fn set_enabled(&self, enabled: bool) {
        if self.inner.enabled.replace(enabled) == enabled {
            return;
        }
        if !enabled {
            let mut state = self.inner.state.borrow_mut();
            state.suppressed = state.touch;
            state.reset();
        }
        tracing::trace!(kind = ?self.inner.kind, enabled, "recognizer toggled");
    }

    pub fn phase(&self) -> GesturePhase {
        self.inner.state.borrow().phase
    }

    /// A sequence has begun and not yet ended
    pub fn is_tracking(&self) -> bool {
        self.phase().is_active()
    }

    /// A touch is down that this recognizer may still claim
    pub fn is_pending(&self) -> bool {
        let state = self.inner.state.borrow();
        state.touch.is_some() && state.phase == GesturePhase::Possible
    }

    /// Do not begin while `other` is pending or tracking
    pub fn require_failure_of(&self, other: &PanRecognizer) -> Result<()> {
        if Rc::ptr_eq(&self.inner, &other.inner) {
            return Err(PlatformError::SelfFailureRequirement);
        }
        self.inner
            .requires_failure_of
            .borrow_mut()
            .push(other.clone());
        Ok(())
    }

    fn is_waiting_on_failure(&self) -> bool {
        self.inner
            .requires_failure_of
            .borrow()
            .iter()
            .any(|other| other.is_pending() || other.is_tracking())
    }

    fn event(&self, phase: GesturePhase, state: &TrackingState) -> PanEvent {
        PanEvent::new(
            self.inner.kind,
            phase,
            state.last,
            state.last.delta_from(state.start),
        )
    }

    /// Feed one touch event, returning the pan event it produced, if any
    pub fn handle_touch(&self, touch: &TouchEvent) -> Result<Option<PanEvent>> {
        if !self.is_enabled() {
            return Ok(None);
        }
        let id = touch.id();
        if let TouchEvent::Started { location, .. } = *touch {
            let mut state = self.inner.state.borrow_mut();
            // Extra fingers are ignored while one is tracked
            if state.touch.is_some() {
                return Ok(None);
            }
            state.suppressed = None;
            state.touch = Some(id);
            state.start = location;
            state.last = location;
            state.phase = match self.inner.kind {
                RecognizerKind::ScreenEdgePan if location.x > self.inner.edge_margin => {
                    GesturePhase::Failed
                }
                _ => GesturePhase::Possible,
            };
            return Ok(None);
        }

        {
            let mut state = self.inner.state.borrow_mut();
            if state.suppressed == Some(id) {
                if !matches!(touch, TouchEvent::Moved { .. }) {
                    state.suppressed = None;
                }
                return Ok(None);
            }
            match state.touch {
                Some(tracked) if tracked == id => {}
                Some(_) => return Ok(None),
                None => return Err(PlatformError::TouchNotStarted(id)),
            }
            if let Some(location) = touch.location() {
                state.last = location;
            }
        }

        match touch {
            TouchEvent::Moved { .. } => {
                let phase = match self.phase() {
                    GesturePhase::Possible if self.is_waiting_on_failure() => return Ok(None),
                    GesturePhase::Possible => GesturePhase::Began,
                    GesturePhase::Began | GesturePhase::Changed => GesturePhase::Changed,
                    _ => return Ok(None),
                };
                let mut state = self.inner.state.borrow_mut();
                state.phase = phase;
                Ok(Some(self.event(phase, &state)))
            }
            TouchEvent::Ended { .. } | TouchEvent::Cancelled { .. } => {
                let mut state = self.inner.state.borrow_mut();
                let phase = if matches!(touch, TouchEvent::Ended { .. }) {
                    GesturePhase::Ended
                } else {
                    GesturePhase::Cancelled
                };
                let event = state.phase.is_active().then(|| self.event(phase, &state));
                state.reset();
                Ok(event)
            }
            TouchEvent::Started { .. } => Ok(None),
        }
    }
}
