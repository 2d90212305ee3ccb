//! Card detail screen and its interactive drag-to-dismiss controller
//!
//! The detail screen can be dismissed by dragging down once its content is
//! scrolled to the top, or by panning in from the left screen edge. While the
//! finger moves, a zero-duration proxy animator (shrink + round corners) is
//! scrubbed to `translation / dismissal_distance`:
//!
//! ```text
//! began    → create the proxy animator, paused at 0
//! changed  → fraction_complete = progress; progress >= 1 commits
//! ended    → reverse to 0 with the recognizer disabled, then reset
//! ```
//!
//! A commit force-finishes the proxy at its end and raises a dismissal
//! request that the owning [`CardTransition`](crate::CardTransition) turns
//! into an animated dismissal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use folio_animation::{AnimatingPosition, PropertyAnimator, SchedulerHandle, TimingCurve};
use folio_core::{Point, ScrollMetrics, SharedViewTree, ViewId, ViewProperty};
use folio_platform::{
    GesturePhase, PanEvent, PanRecognizer, RecognizerKind, ScreenLifecycle, TouchEvent,
};

use crate::config::TransitionConfig;
use crate::context::{ScreenViews, TransitionContext};
use crate::error::Result;
use crate::snapshot::CardContent;
use crate::status_bar::{
    StatusBarAnimatable, StatusBarAnimation, StatusBarConfig, StatusBarController,
};

/// Gesture progress toward a committed dismissal
pub fn dismissal_progress(translation: f32, distance: f32) -> f32 {
    translation / distance
}

/// Decides when scrolling turns into dragging the screen down
pub trait DragToDismissDelegate {
    /// Called on every scroll while not yet dragging to dismiss. By default
    /// a drag starts once the user pulls the content down past its top.
    fn should_begin_drag_down_to_dismiss(&self, metrics: &ScrollMetrics) -> bool {
        metrics.is_tracking && metrics.content_offset.y < 0.0
    }

    /// The drag committed and a dismissal was requested
    fn did_drag_down_to_dismiss(&self) {}
}

struct DefaultDragDelegate;

impl DragToDismissDelegate for DefaultDragDelegate {}

/// Per-sequence state of the dismissal gesture
#[derive(Debug, Default)]
pub struct GestureTrackingState {
    /// Screen location of the first accepted event
    pub origin_point: Option<Point>,
    pub is_active: bool,
    /// The proxy animator scrubbed by the gesture
    pub current_driver: Option<PropertyAnimator>,
}

impl GestureTrackingState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.origin_point.is_none() && !self.is_active && self.current_driver.is_none()
    }
}

struct DetailInner {
    tree: SharedViewTree,
    scheduler: SchedulerHandle,
    config: TransitionConfig,
    root: ViewId,
    scroll: ViewId,
    vertical_pan: PanRecognizer,
    edge_pan: PanRecognizer,
    content: RefCell<CardContent>,
    unhighlighted_content: CardContent,
    font_state_highlighted: Cell<bool>,
    dragging_down_to_dismiss: Cell<bool>,
    /// Set by a commit; swallows the rest of that gesture sequence
    committed: Cell<bool>,
    tracking: RefCell<GestureTrackingState>,
    dismiss_requested: Cell<bool>,
    delegate: RefCell<Option<Rc<dyn DragToDismissDelegate>>>,
    status_bar: StatusBarController,
    presenting_context: RefCell<Option<TransitionContext>>,
}

/// Full-screen detail of a tapped card
///
/// A cheap shared handle; clones refer to the same screen.
#[derive(Clone)]
pub struct CardDetailScreen {
    inner: Rc<DetailInner>,
}

impl std::fmt::Debug for CardDetailScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetailScreen")
            .field("root", &self.inner.root)
            .field("dragging_down_to_dismiss", &self.inner.dragging_down_to_dismiss.get())
            .field("tracking", &self.inner.tracking.borrow())
            .finish()
    }
}

impl CardDetailScreen {
    /// Build the screen's views detached from the tree, with scrolling off
    /// until the presentation finishes
    pub fn new(
        tree: SharedViewTree,
        scheduler: SchedulerHandle,
        config: TransitionConfig,
        content: CardContent,
        unhighlighted_content: CardContent,
    ) -> Result<Self> {
        let (root, scroll) = {
            let mut t = tree.borrow_mut();
            let bounds = t.screen_bounds();
            let root = t.create_view("card_detail", bounds);
            let scroll = t.create_scroll_view("card_detail_scroll", bounds);
            t.add_subview(root, scroll)?;
            t.scroll_metrics_mut(scroll)?.scroll_enabled = false;
            (root, scroll)
        };

        // Drag-down and scrolling wait for the edge pan to fail
        let vertical_pan = PanRecognizer::vertical();
        let edge_pan = PanRecognizer::screen_edge();
        vertical_pan.require_failure_of(&edge_pan)?;

        Ok(Self {
            inner: Rc::new(DetailInner {
                tree,
                scheduler,
                config,
                root,
                scroll,
                vertical_pan,
                edge_pan,
                content: RefCell::new(content),
                unhighlighted_content,
                font_state_highlighted: Cell::new(true),
                dragging_down_to_dismiss: Cell::new(false),
                committed: Cell::new(false),
                tracking: RefCell::new(GestureTrackingState::default()),
                dismiss_requested: Cell::new(false),
                delegate: RefCell::new(None),
                status_bar: StatusBarController::default(),
                presenting_context: RefCell::new(None),
            }),
        })
    }

    pub fn root_view(&self) -> ViewId {
        self.inner.root
    }

    pub fn scroll_view(&self) -> ViewId {
        self.inner.scroll
    }

    pub fn views(&self) -> ScreenViews {
        ScreenViews {
            root: self.inner.root,
            scroll: Some(self.inner.scroll),
        }
    }

    pub fn content(&self) -> CardContent {
        self.inner.content.borrow().clone()
    }

    pub fn is_font_state_highlighted(&self) -> bool {
        self.inner.font_state_highlighted.get()
    }

    pub fn set_font_state_highlighted(&self, highlighted: bool) {
        self.inner.font_state_highlighted.set(highlighted);
    }

    pub fn is_dragging_down_to_dismiss(&self) -> bool {
        self.inner.dragging_down_to_dismiss.get()
    }

    pub fn vertical_pan(&self) -> &PanRecognizer {
        &self.inner.vertical_pan
    }

    pub fn edge_pan(&self) -> &PanRecognizer {
        &self.inner.edge_pan
    }

    fn recognizer(&self, kind: RecognizerKind) -> &PanRecognizer {
        match kind {
            RecognizerKind::VerticalPan => &self.inner.vertical_pan,
            RecognizerKind::ScreenEdgePan => &self.inner.edge_pan,
        }
    }

    pub fn set_delegate(&self, delegate: Rc<dyn DragToDismissDelegate>) {
        self.inner.delegate.replace(Some(delegate));
    }

    fn delegate(&self) -> Rc<dyn DragToDismissDelegate> {
        self.inner
            .delegate
            .borrow()
            .clone()
            .unwrap_or_else(|| Rc::new(DefaultDragDelegate))
    }

    /// The transition this screen is appearing in, read by lifecycle hooks
    pub fn set_presenting_context(&self, ctx: Option<TransitionContext>) {
        self.inner.presenting_context.replace(ctx);
    }

    /// Consume a pending dismissal request raised by a committed drag
    pub fn take_dismiss_request(&self) -> bool {
        self.inner.dismiss_requested.replace(false)
    }

    pub fn interactive_starting_point(&self) -> Option<Point> {
        self.inner.tracking.borrow().origin_point
    }

    /// The proxy animator of the current gesture sequence
    pub fn dismissal_driver(&self) -> Option<PropertyAnimator> {
        self.inner.tracking.borrow().current_driver.clone()
    }

    pub fn is_tracking_empty(&self) -> bool {
        self.inner.tracking.borrow().is_empty()
    }

    fn is_reversing(&self) -> bool {
        self.inner
            .tracking
            .borrow()
            .current_driver
            .as_ref()
            .is_some_and(|d| d.is_running() && d.is_reversed())
    }

    // ========================================================================
    // Gesture handling
    // ========================================================================

    /// Feed a raw touch through the edge and vertical recognizers
    pub fn handle_touch(&self, touch: &TouchEvent) -> Result<()> {
        let edge = self.inner.edge_pan.handle_touch(touch)?;
        let vertical = self.inner.vertical_pan.handle_touch(touch)?;
        for event in [edge, vertical].into_iter().flatten() {
            self.handle_pan(event)?;
        }
        Ok(())
    }

    /// Drive the dismissal from one pan event
    ///
    /// # Panics
    ///
    /// Recognizers never deliver `Possible` or `Failed`; receiving either is
    /// a logic error.
    pub fn handle_pan(&self, event: PanEvent) -> Result<()> {
        let inner = &self.inner;
        let is_edge_pan = event.recognizer == RecognizerKind::ScreenEdgePan;

        // Checked first: the success path clears drag mode before the
        // sequence's terminal event arrives
        if inner.committed.get() {
            if event.phase.is_terminal() {
                inner.committed.set(false);
            }
            tracing::trace!(phase = ?event.phase, "ignoring gesture after commit");
            return Ok(());
        }
        // Vertical pans only count once scrolling handed over to dismissal
        if !is_edge_pan && !inner.dragging_down_to_dismiss.get() {
            return Ok(());
        }
        if !self.recognizer(event.recognizer).is_enabled() || self.is_reversing() {
            return Ok(());
        }

        let origin = *inner
            .tracking
            .borrow_mut()
            .origin_point
            .get_or_insert(event.location);
        let distance = inner.config.dismissal_distance;
        let progress = if is_edge_pan {
            dismissal_progress(event.translation.x, distance)
        } else {
            dismissal_progress(event.location.y - origin.y, distance)
        };

        match event.phase {
            GesturePhase::Began => {
                self.dismissal_driver_or_create()?;
                inner.tracking.borrow_mut().is_active = true;
            }
            GesturePhase::Changed => {
                let driver = self.dismissal_driver_or_create()?;
                inner.tracking.borrow_mut().is_active = true;
                driver.set_fraction_complete(progress)?;
                if progress >= 1.0 {
                    self.commit_dismissal(&driver)?;
                }
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {
                self.reverse_dismissal(event.recognizer)?;
            }
            phase @ (GesturePhase::Possible | GesturePhase::Failed) => {
                panic!("impossible gesture phase for dismissal pan: {phase:?}")
            }
        }
        Ok(())
    }

    fn dismissal_driver_or_create(&self) -> Result<PropertyAnimator> {
        if let Some(driver) = self.dismissal_driver() {
            return Ok(driver);
        }
        let inner = &self.inner;
        let driver = PropertyAnimator::new(inner.scheduler.clone(), 0.0, TimingCurve::Linear)?;
        driver.add_animation(
            inner.root,
            ViewProperty::Scale,
            inner.config.dismissal_shrink_scale,
        )?;
        driver.add_animation(
            inner.root,
            ViewProperty::CornerRadius,
            inner.config.card_corner_radius,
        )?;
        driver.pause()?;
        driver.set_fraction_complete(0.0)?;
        inner.tracking.borrow_mut().current_driver = Some(driver.clone());
        tracing::debug!(animator = driver.id().to_raw(), "dismissal driver created");
        Ok(driver)
    }

    fn commit_dismissal(&self, driver: &PropertyAnimator) -> Result<()> {
        driver.stop(false)?;
        let screen = Rc::downgrade(&self.inner);
        driver.add_completion(move |position| match position {
            AnimatingPosition::End => {
                if let Some(inner) = screen.upgrade() {
                    CardDetailScreen { inner }.did_successfully_drag_down_to_dismiss();
                }
            }
            other => panic!("committed dismissal must finish at the end, finished at {other:?}"),
        })?;
        driver.finish(AnimatingPosition::End)?;
        self.inner.committed.set(true);
        tracing::debug!("interactive dismissal committed");
        Ok(())
    }

    fn reverse_dismissal(&self, kind: RecognizerKind) -> Result<()> {
        let Some(driver) = self.dismissal_driver() else {
            tracing::warn!("gesture resolved before a dismissal driver existed");
            self.did_cancel_dismissal_transition();
            return Ok(());
        };
        driver.pause()?;
        driver.set_reversed(true)?;

        // Re-enabled once the reversal lands
        let recognizer = self.recognizer(kind).clone();
        recognizer.set_enabled(false);
        let screen = Rc::downgrade(&self.inner);
        driver.add_completion(move |_| {
            if let Some(inner) = screen.upgrade() {
                CardDetailScreen { inner }.did_cancel_dismissal_transition();
            }
            recognizer.set_enabled(true);
        })?;
        driver.start()?;
        tracing::debug!(
            progress = driver.fraction_complete(),
            "interactive dismissal reversing"
        );
        Ok(())
    }

    fn did_successfully_drag_down_to_dismiss(&self) {
        let inner = &self.inner;
        inner
            .content
            .replace(inner.unhighlighted_content.clone());
        inner.tracking.borrow_mut().reset();
        inner.dragging_down_to_dismiss.set(false);
        inner.dismiss_requested.set(true);
        self.delegate().did_drag_down_to_dismiss();
        tracing::debug!("drag down to dismiss succeeded");
    }

    /// Clear all tracking state. Safe to call repeatedly.
    pub fn did_cancel_dismissal_transition(&self) {
        let inner = &self.inner;
        inner.tracking.borrow_mut().reset();
        inner.dragging_down_to_dismiss.set(false);
        inner.committed.set(false);
        if let Ok(metrics) = inner.tree.borrow_mut().scroll_metrics_mut(inner.scroll) {
            metrics.shows_vertical_indicator = true;
        }
    }

    // ========================================================================
    // Scroll coordination
    // ========================================================================

    /// Called after the detail content scrolled
    ///
    /// Pulling past the top switches into drag-to-dismiss mode, which pins
    /// the content at zero until the gesture resolves.
    pub fn scroll_view_did_scroll(&self) -> Result<()> {
        let inner = &self.inner;
        if inner.edge_pan.is_tracking() {
            return Ok(());
        }
        let metrics = *inner.tree.borrow().scroll_metrics(inner.scroll)?;
        let dragging = inner.dragging_down_to_dismiss.get()
            || self.delegate().should_begin_drag_down_to_dismiss(&metrics);

        let mut tree = inner.tree.borrow_mut();
        let metrics = tree.scroll_metrics_mut(inner.scroll)?;
        if dragging {
            if !inner.dragging_down_to_dismiss.replace(true) {
                tracing::debug!("scroll handed over to drag down to dismiss");
            }
            metrics.content_offset = Point::ZERO;
        }
        metrics.shows_vertical_indicator = !dragging;
        Ok(())
    }

    /// Called when the user lifts the finger off scrolling content
    pub fn scroll_view_will_end_dragging(&self, velocity: Point) -> Result<()> {
        let mut tree = self.inner.tree.borrow_mut();
        let metrics = tree.scroll_metrics_mut(self.inner.scroll)?;
        if !metrics.is_dragging {
            tracing::trace!("end of drag reported while not dragging");
            return Ok(());
        }
        // A fast flick down at the top would otherwise keep scrolling
        if velocity.y > 0.0 && metrics.content_offset.y <= 0.0 {
            metrics.content_offset = Point::ZERO;
        }
        Ok(())
    }
}

impl StatusBarAnimatable for CardDetailScreen {
    fn status_bar_config(&self) -> StatusBarConfig {
        StatusBarConfig::new(true, StatusBarAnimation::Slide)
            .with_animation_duration(self.inner.config.status_bar_animation_duration)
    }

    fn status_bar(&self) -> &StatusBarController {
        &self.inner.status_bar
    }
}

impl ScreenLifecycle for CardDetailScreen {
    fn on_will_appear(&mut self, _animated: bool) {
        let ctx = self.inner.presenting_context.borrow().clone();
        self.inner
            .status_bar
            .will_appear(self.status_bar_config(), ctx.as_ref());
    }

    fn on_did_disappear(&mut self, _animated: bool) {
        self.inner.status_bar.did_disappear();
        self.inner.presenting_context.replace(None);
    }
}
