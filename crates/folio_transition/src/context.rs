//! Transition context shared between the coordinator and an animator

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio_core::{SharedViewTree, ViewId};

/// Which way a transition goes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionDirection {
    /// Card list → detail screen
    Present,
    /// Detail screen → card list
    Dismiss,
}

/// The views a screen contributes to a transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenViews {
    pub root: ViewId,
    /// Scrollable content, if the screen has any
    pub scroll: Option<ViewId>,
}

type InteractionObserver = Box<dyn FnOnce(bool)>;

struct ContextInner {
    tree: SharedViewTree,
    container: ViewId,
    direction: TransitionDirection,
    from: ScreenViews,
    to: ScreenViews,
    duration: Cell<f32>,
    interactive: Cell<bool>,
    cancelled: Cell<bool>,
    completed: Cell<Option<bool>>,
    interaction_observers: RefCell<Vec<InteractionObserver>>,
}

/// State of one in-flight transition
///
/// Cloning yields another handle to the same context, so completion
/// handlers can report back without borrowing the coordinator.
#[derive(Clone)]
pub struct TransitionContext {
    inner: Rc<ContextInner>,
}

impl std::fmt::Debug for TransitionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionContext")
            .field("direction", &self.inner.direction)
            .field("cancelled", &self.inner.cancelled.get())
            .field("completed", &self.inner.completed.get())
            .finish()
    }
}

impl TransitionContext {
    /// `container` hosts the transition's temporary views and receives the
    /// appearing screen's root when it finishes.
    pub fn new(
        tree: SharedViewTree,
        container: ViewId,
        direction: TransitionDirection,
        from: ScreenViews,
        to: ScreenViews,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                tree,
                container,
                direction,
                from,
                to,
                duration: Cell::new(0.0),
                interactive: Cell::new(false),
                cancelled: Cell::new(false),
                completed: Cell::new(None),
                interaction_observers: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn tree(&self) -> &SharedViewTree {
        &self.inner.tree
    }

    pub fn container(&self) -> ViewId {
        self.inner.container
    }

    pub fn direction(&self) -> TransitionDirection {
        self.inner.direction
    }

    pub fn from_views(&self) -> ScreenViews {
        self.inner.from
    }

    pub fn to_views(&self) -> ScreenViews {
        self.inner.to
    }

    pub fn transition_duration(&self) -> f32 {
        self.inner.duration.get()
    }

    pub fn set_transition_duration(&self, duration: f32) {
        self.inner.duration.set(duration);
    }

    // ========================================================================
    // Interactivity
    // ========================================================================

    /// True while a gesture drives the transition
    pub fn is_interactive(&self) -> bool {
        self.inner.interactive.get()
    }

    /// Mark the transition as starting under gesture control
    pub fn begin_interaction(&self) {
        self.inner.interactive.set(true);
    }

    /// Run `observer` once interactivity ends. The argument is true when the
    /// interaction ended by cancelling the transition. Ignored for
    /// non-interactive transitions.
    pub fn notify_when_interaction_ends<F>(&self, observer: F)
    where
        F: FnOnce(bool) + 'static,
    {
        if self.is_interactive() {
            self.inner
                .interaction_observers
                .borrow_mut()
                .push(Box::new(observer));
        }
    }

    /// Hand the transition back to time-driven animation
    pub fn end_interaction(&self, cancelled: bool) {
        if !self.inner.interactive.replace(false) {
            return;
        }
        if cancelled {
            self.cancel();
        }
        let observers = std::mem::take(&mut *self.inner.interaction_observers.borrow_mut());
        for observer in observers {
            observer(cancelled);
        }
    }

    // ========================================================================
    // Completion
    // ========================================================================

    /// Mark the transition as cancelled by the platform. The animation keeps
    /// running and its completion takes the restore branch.
    pub fn cancel(&self) {
        if !self.inner.cancelled.replace(true) {
            tracing::debug!(direction = ?self.inner.direction, "transition cancelled");
        }
    }

    pub fn transition_was_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    /// Report the outcome. Only the first report counts.
    pub fn complete_transition(&self, success: bool) {
        if let Some(previous) = self.inner.completed.get() {
            tracing::warn!(
                direction = ?self.inner.direction,
                previous,
                success,
                "transition completed twice"
            );
            return;
        }
        self.inner.completed.set(Some(success));
        tracing::debug!(direction = ?self.inner.direction, success, "transition completed");
    }

    /// `Some(success)` once the animator has reported
    pub fn completion(&self) -> Option<bool> {
        self.inner.completed.get()
    }
}
