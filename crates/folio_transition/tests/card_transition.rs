//! End-to-end card transitions driven frame by frame

use std::cell::Cell;
use std::rc::Rc;

use folio_animation::AnimationScheduler;
use folio_core::{Point, Rect, SharedViewTree, Size, ViewId};
use folio_platform::{GesturePhase, PanEvent, RecognizerKind, TouchEvent};
use folio_transition::prelude::*;
use folio_transition::{set_card_highlighted, StatusBarAnimation};

const FRAME: f32 = 1.0 / 60.0;
const MAX_FRAMES: usize = 600;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Harness {
    tree: SharedViewTree,
    scheduler: AnimationScheduler,
    transition: CardTransition,
    cell: ViewId,
}

impl Harness {
    fn new(config: TransitionConfig) -> Self {
        init_tracing();
        let tree = folio_core::ViewTree::shared(Size::new(375.0, 812.0));
        let scheduler = AnimationScheduler::new(tree.clone());

        let (list, cell) = {
            let mut t = tree.borrow_mut();
            let root = t.root();
            let bounds = t.screen_bounds();
            let list = t.create_view("card_list", bounds);
            t.add_subview(root, list).unwrap();
            let cell = t.create_view("card_cell", Rect::new(20.0, 300.0, 335.0, 400.0));
            t.add_subview(list, cell).unwrap();
            // Still shrunk from the highlight when tapped
            set_card_highlighted(&mut t, cell, true, &config).unwrap();
            (list, cell)
        };

        let transition = CardTransition::present_from_tap(
            tree.clone(),
            scheduler.handle(),
            config,
            ScreenViews {
                root: list,
                scroll: None,
            },
            TapInfo {
                cell,
                content: CardContent::new("Game of the day", "Folio", "A short description"),
            },
        )
        .unwrap();

        Self {
            tree,
            scheduler,
            transition,
            cell,
        }
    }

    /// Tick and poll until nothing runs, collecting finished transitions
    fn run(&mut self) -> Vec<TransitionOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..MAX_FRAMES {
            let busy = self.scheduler.tick(FRAME);
            if let Some(outcome) = self.transition.poll().unwrap() {
                outcomes.push(outcome);
            }
            if !busy && !self.transition.is_in_flight() {
                break;
            }
        }
        outcomes
    }

    fn present(&mut self) {
        self.transition.begin(TransitionDirection::Present).unwrap();
        let outcomes = self.run();
        assert_eq!(
            outcomes,
            vec![TransitionOutcome {
                direction: TransitionDirection::Present,
                completed: true,
            }]
        );
    }

    fn detail_root(&self) -> ViewId {
        self.transition.detail().root_view()
    }

    fn animated_containers(&self) -> usize {
        let tree = self.tree.borrow();
        tree.children(tree.root())
            .iter()
            .filter(|&&v| tree.node(v).map(|n| n.name) == Ok("animated_container"))
            .count()
    }

    fn touch(&self, touch: TouchEvent) {
        self.transition.detail().handle_touch(&touch).unwrap();
    }
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_present_fills_screen() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.present();

    let tree = h.tree.borrow();
    let root = tree.root();
    assert_eq!(tree.parent(h.detail_root()), Some(root));
    let frame = tree.frame(h.detail_root()).unwrap();
    assert!(frame.approx_eq(&tree.screen_bounds(), 1e-3));
    assert_eq!(tree.corner_radius(h.detail_root()).unwrap(), 0.0);
    assert!(tree.is_hidden(h.cell).unwrap());
    assert!(
        tree.scroll_metrics(h.transition.detail().scroll_view())
            .unwrap()
            .scroll_enabled
    );
    drop(tree);
    assert_eq!(h.animated_containers(), 0);
}

#[test]
fn test_presentation_spring_follows_card_position() {
    let h = Harness::new(TransitionConfig::standard());
    // 335x400 at scale 0.96 around (187.5, 500)
    let from = h.transition.params().from_card_frame;
    assert!(approx(from.min_y(), 308.0));
    assert!(approx(from.height(), 384.0));

    let spring = h.transition.present_animator().spring();
    assert!(approx(spring.damping, 1.0 - 0.3 * 308.0 / 812.0));
    assert!(approx(spring.duration, 0.5 + 0.4 * 308.0 / 812.0));
}

#[test]
fn test_present_context_carries_duration() {
    let mut h = Harness::new(TransitionConfig::standard());
    let ctx = h.transition.begin(TransitionDirection::Present).unwrap();
    let spring = h.transition.present_animator().spring();
    assert_eq!(ctx.transition_duration(), spring.duration);
    assert!(h.transition.interruptible_animator().is_some());
    assert_eq!(h.animated_containers(), 1);
}

#[test]
fn test_status_bar_hidden_while_presented() {
    let mut h = Harness::new(TransitionConfig::standard());
    assert!(!h.transition.status_bar_source().status_bar().is_hidden());
    h.present();

    let status_bar = h.transition.status_bar_source().status_bar();
    assert!(status_bar.is_hidden());
    let update = status_bar.last_update().unwrap();
    assert_eq!(update.animation, StatusBarAnimation::Slide);
    assert!(approx(update.duration, 0.4));

    h.transition.begin(TransitionDirection::Dismiss).unwrap();
    h.run();
    assert!(!h.transition.status_bar_source().status_bar().is_hidden());
}

#[test]
fn test_present_then_dismiss_restores_list() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.present();

    // Scrolled content returns to the top during the dismissal
    h.tree
        .borrow_mut()
        .scroll_metrics_mut(h.transition.detail().scroll_view())
        .unwrap()
        .content_offset = Point::new(0.0, 300.0);

    h.transition.begin(TransitionDirection::Dismiss).unwrap();
    assert!(!h.transition.detail().is_font_state_highlighted());
    let outcomes = h.run();
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            direction: TransitionDirection::Dismiss,
            completed: true,
        }]
    );

    let tree = h.tree.borrow();
    assert!(!tree.is_attached(h.detail_root()));
    assert!(!tree.is_hidden(h.cell).unwrap());
    let offset = tree
        .scroll_metrics(h.transition.detail().scroll_view())
        .unwrap()
        .content_offset;
    assert!(approx(offset.y, 0.0));
    drop(tree);
    assert_eq!(h.animated_containers(), 0);
    assert!(!h.transition.is_in_flight());
}

#[test]
fn test_from_center_starts_centered_on_card() {
    let mut h = Harness::new(TransitionConfig::centered());
    h.transition.begin(TransitionDirection::Present).unwrap();

    {
        let tree = h.tree.borrow();
        let container = tree
            .children(tree.root())
            .iter()
            .copied()
            .find(|&v| tree.node(v).map(|n| n.name) == Ok("animated_container"))
            .unwrap();
        // Card center 500 minus half the screen height
        assert!(approx(tree.frame(container).unwrap().y(), 94.0));
        let card = tree.frame(h.detail_root()).unwrap();
        assert!(approx(card.y(), (812.0 - 384.0) / 2.0));
        assert!(approx(card.height(), 384.0));
    }

    let outcomes = h.run();
    assert!(outcomes[0].completed);
    let tree = h.tree.borrow();
    let frame = tree.frame(h.detail_root()).unwrap();
    assert!(frame.approx_eq(&tree.screen_bounds(), 1e-3));
}

#[test]
fn test_cancelled_present_restores_cell() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.transition.begin(TransitionDirection::Present).unwrap();
    h.scheduler.tick(FRAME);
    h.transition.cancel();

    let outcomes = h.run();
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            direction: TransitionDirection::Present,
            completed: false,
        }]
    );
    let tree = h.tree.borrow();
    assert!(!tree.is_hidden(h.cell).unwrap());
    assert!(!tree.is_attached(h.detail_root()));
    drop(tree);
    assert_eq!(h.animated_containers(), 0);
}

#[test]
fn test_second_transition_is_rejected_while_in_flight() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.transition.begin(TransitionDirection::Present).unwrap();
    let err = h.transition.begin(TransitionDirection::Dismiss).unwrap_err();
    assert!(matches!(
        err,
        TransitionError::AlreadyInFlight(TransitionDirection::Present)
    ));
    assert_eq!(
        h.transition.active_direction(),
        Some(TransitionDirection::Present)
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    init_tracing();
    let tree = folio_core::ViewTree::shared(Size::new(375.0, 812.0));
    let scheduler = AnimationScheduler::new(tree.clone());
    let (root, cell) = {
        let mut t = tree.borrow_mut();
        let root = t.root();
        let cell = t.create_view("card_cell", Rect::new(20.0, 100.0, 335.0, 400.0));
        t.add_subview(root, cell).unwrap();
        (root, cell)
    };
    let result = CardTransition::present_from_tap(
        tree,
        scheduler.handle(),
        TransitionConfig::standard().with_dismissal_distance(0.0),
        ScreenViews { root, scroll: None },
        TapInfo {
            cell,
            content: CardContent::new("a", "b", "c"),
        },
    );
    assert!(matches!(result, Err(TransitionError::Config(_))));
}

struct CountingDelegate {
    dismissals: Cell<usize>,
}

impl DragToDismissDelegate for CountingDelegate {
    fn did_drag_down_to_dismiss(&self) {
        self.dismissals.set(self.dismissals.get() + 1);
    }
}

#[test]
fn test_edge_drag_past_threshold_dismisses_once() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.present();
    let delegate = Rc::new(CountingDelegate {
        dismissals: Cell::new(0),
    });
    h.transition.detail().set_delegate(delegate.clone());

    let at = |x: f32| Point::new(x, 400.0);
    h.touch(TouchEvent::Started { id: 7, location: at(5.0) });
    h.touch(TouchEvent::Moved { id: 7, location: at(80.0) });
    assert!(h.transition.detail().dismissal_driver().is_some());

    // 155 points is past the 100 point threshold
    h.touch(TouchEvent::Moved { id: 7, location: at(160.0) });
    {
        let tree = h.tree.borrow();
        assert!(approx(tree.scale(h.detail_root()).unwrap(), 0.86));
        assert!(approx(tree.corner_radius(h.detail_root()).unwrap(), 16.0));
    }
    // Swallowed after the commit
    h.touch(TouchEvent::Moved { id: 7, location: at(260.0) });
    h.touch(TouchEvent::Ended { id: 7, location: at(260.0) });

    let outcomes = h.run();
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            direction: TransitionDirection::Dismiss,
            completed: true,
        }]
    );
    assert_eq!(delegate.dismissals.get(), 1);

    let detail = h.transition.detail();
    assert!(!detail.content().highlighted);
    assert!(detail.is_tracking_empty());
    let tree = h.tree.borrow();
    assert!(!tree.is_attached(h.detail_root()));
    assert!(!tree.is_hidden(h.cell).unwrap());
    assert!(approx(tree.scale(h.detail_root()).unwrap(), 1.0));
}

#[test]
fn test_short_drag_springs_back() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.present();
    let detail = h.transition.detail().clone();

    // Pull the content past its top to hand over to drag-to-dismiss
    {
        let mut tree = h.tree.borrow_mut();
        let metrics = tree.scroll_metrics_mut(detail.scroll_view()).unwrap();
        metrics.is_tracking = true;
        metrics.content_offset = Point::new(0.0, -10.0);
    }
    detail.scroll_view_did_scroll().unwrap();
    assert!(detail.is_dragging_down_to_dismiss());

    let pan = |phase, y: f32| {
        PanEvent::new(
            RecognizerKind::VerticalPan,
            phase,
            Point::new(100.0, y),
            Point::new(0.0, y - 200.0),
        )
    };
    detail.handle_pan(pan(GesturePhase::Began, 200.0)).unwrap();
    detail.handle_pan(pan(GesturePhase::Changed, 240.0)).unwrap();
    assert_eq!(detail.interactive_starting_point(), Some(Point::new(100.0, 200.0)));
    assert!(approx(
        h.tree.borrow().scale(detail.root_view()).unwrap(),
        1.0 - 0.14 * 0.4
    ));

    detail.handle_pan(pan(GesturePhase::Ended, 240.0)).unwrap();
    assert!(!detail.vertical_pan().is_enabled());

    let outcomes = h.run();
    assert!(outcomes.is_empty());
    assert!(detail.vertical_pan().is_enabled());
    assert!(detail.is_tracking_empty());
    assert!(!detail.is_dragging_down_to_dismiss());

    let tree = h.tree.borrow();
    assert!(approx(tree.scale(detail.root_view()).unwrap(), 1.0));
    assert!(approx(tree.corner_radius(detail.root_view()).unwrap(), 0.0));
    assert!(tree.is_attached(detail.root_view()));
    assert!(
        tree.scroll_metrics(detail.scroll_view())
            .unwrap()
            .shows_vertical_indicator
    );
}

fn vertical(phase: GesturePhase, y: f32) -> PanEvent {
    PanEvent::new(
        RecognizerKind::VerticalPan,
        phase,
        Point::new(100.0, y),
        Point::new(0.0, y - 200.0),
    )
}

#[test]
fn test_vertical_drag_past_threshold_dismisses_once() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.present();
    let detail = h.transition.detail().clone();
    let delegate = Rc::new(CountingDelegate {
        dismissals: Cell::new(0),
    });
    detail.set_delegate(delegate.clone());

    {
        let mut tree = h.tree.borrow_mut();
        let metrics = tree.scroll_metrics_mut(detail.scroll_view()).unwrap();
        metrics.is_tracking = true;
        metrics.content_offset = Point::new(0.0, -10.0);
    }
    detail.scroll_view_did_scroll().unwrap();

    // 150 points is past the 100 point threshold
    detail.handle_pan(vertical(GesturePhase::Began, 200.0)).unwrap();
    detail.handle_pan(vertical(GesturePhase::Changed, 350.0)).unwrap();

    // The commit completes on the next frame and polling starts the dismissal
    h.scheduler.tick(FRAME);
    assert_eq!(h.transition.poll().unwrap(), None);
    assert_eq!(
        h.transition.active_direction(),
        Some(TransitionDirection::Dismiss)
    );
    assert!(!detail.is_dragging_down_to_dismiss());
    detail.handle_pan(vertical(GesturePhase::Ended, 350.0)).unwrap();

    let outcomes = h.run();
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            direction: TransitionDirection::Dismiss,
            completed: true,
        }]
    );
    assert_eq!(delegate.dismissals.get(), 1);
    {
        let tree = h.tree.borrow();
        assert!(!tree.is_attached(h.detail_root()));
        assert!(!tree.is_hidden(h.cell).unwrap());
    }

    // The next gesture sequence is tracked again
    let edge = |phase, x: f32| {
        PanEvent::new(
            RecognizerKind::ScreenEdgePan,
            phase,
            Point::new(x, 400.0),
            Point::new(x, 0.0),
        )
    };
    detail.handle_pan(edge(GesturePhase::Began, 0.0)).unwrap();
    detail.handle_pan(edge(GesturePhase::Changed, 50.0)).unwrap();
    let driver = detail.dismissal_driver().unwrap();
    assert!(approx(driver.fraction_complete(), 0.5));
    assert_eq!(delegate.dismissals.get(), 1);
}

#[test]
fn test_cancelled_dismiss_restores_detail() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.present();

    h.transition.begin(TransitionDirection::Dismiss).unwrap();
    h.scheduler.tick(FRAME);
    h.transition.cancel();

    let outcomes = h.run();
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            direction: TransitionDirection::Dismiss,
            completed: false,
        }]
    );

    let detail = h.transition.detail();
    assert!(detail.is_font_state_highlighted());
    let tree = h.tree.borrow();
    assert_eq!(tree.parent(h.detail_root()), Some(tree.root()));
    let frame = tree.frame(h.detail_root()).unwrap();
    assert!(frame.approx_eq(&Rect::new(0.0, 0.0, 375.0, 812.0), 1e-3));
    assert!(approx(tree.scale(h.detail_root()).unwrap(), 1.0));
    assert!(approx(tree.corner_radius(h.detail_root()).unwrap(), 0.0));
    assert!(tree.is_hidden(h.cell).unwrap());
    drop(tree);
    assert_eq!(h.animated_containers(), 0);
    assert!(!h.transition.is_in_flight());
}

#[test]
fn test_interactive_present_defers_status_bar() {
    let mut h = Harness::new(TransitionConfig::standard());
    let ctx = h
        .transition
        .begin_interactive(TransitionDirection::Present)
        .unwrap();
    assert!(ctx.is_interactive());

    let driver = h.transition.interruptible_animator().unwrap();
    driver.set_fraction_complete(0.5).unwrap();
    h.scheduler.tick(FRAME);
    assert!(approx(driver.fraction_complete(), 0.5));
    assert!(!h.transition.status_bar_source().status_bar().is_hidden());

    h.transition.end_interaction(false).unwrap();
    assert!(!ctx.is_interactive());
    assert!(h.transition.status_bar_source().status_bar().is_hidden());

    let outcomes = h.run();
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            direction: TransitionDirection::Present,
            completed: true,
        }]
    );
    let tree = h.tree.borrow();
    let frame = tree.frame(h.detail_root()).unwrap();
    assert!(frame.approx_eq(&tree.screen_bounds(), 1e-3));
}

#[test]
fn test_cancelled_interaction_reverses_present() {
    let mut h = Harness::new(TransitionConfig::standard());
    h.transition
        .begin_interactive(TransitionDirection::Present)
        .unwrap();
    let driver = h.transition.interruptible_animator().unwrap();
    driver.set_fraction_complete(0.3).unwrap();

    h.transition.end_interaction(true).unwrap();
    assert!(driver.is_reversed());

    let outcomes = h.run();
    assert_eq!(
        outcomes,
        vec![TransitionOutcome {
            direction: TransitionDirection::Present,
            completed: false,
        }]
    );
    assert!(!h.transition.status_bar_source().status_bar().is_hidden());
    assert!(h.transition.status_bar_source().status_bar().last_update().is_none());
    let tree = h.tree.borrow();
    assert!(!tree.is_attached(h.detail_root()));
    assert!(!tree.is_hidden(h.cell).unwrap());
}
