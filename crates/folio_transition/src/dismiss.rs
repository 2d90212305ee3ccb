//! Card dismissal: the detail view springs back into the card it came from

use std::rc::Rc;

use folio_animation::{PropertyAnimator, SchedulerHandle, TimingCurve, TrackTiming};
use folio_core::{SharedViewTree, ViewId, ViewProperty};

use crate::animator::{trace_animating_view, TransitionAnimator};
use crate::config::TransitionConfig;
use crate::context::TransitionContext;
use crate::detail::CardDetailScreen;
use crate::error::Result;
use crate::snapshot::TransitionParams;

/// Share of the dismissal spent scrolling the content back to the top
const SCROLL_RESET_RELATIVE_DURATION: f32 = 0.6;

/// Non-interactive reverse transition from the detail screen to the card
///
/// Also finishes a committed drag-to-dismiss, picking up the detail view at
/// whatever scale the gesture left it.
pub struct DismissCardAnimator {
    params: Rc<TransitionParams>,
    config: TransitionConfig,
    scheduler: SchedulerHandle,
    detail: CardDetailScreen,
    driver: Option<PropertyAnimator>,
}

impl DismissCardAnimator {
    pub fn new(
        params: Rc<TransitionParams>,
        config: TransitionConfig,
        scheduler: SchedulerHandle,
        detail: CardDetailScreen,
    ) -> Self {
        Self {
            params,
            config,
            scheduler,
            detail,
            driver: None,
        }
    }
}

impl TransitionAnimator for DismissCardAnimator {
    fn transition_duration(&self) -> f32 {
        self.config.dismissal_animation_duration
    }

    fn animate_transition(&mut self, ctx: &TransitionContext) -> Result<()> {
        let tree = ctx.tree().clone();
        let detail = ctx.from_views();
        let detail_view = detail.root;
        let target = self.params.from_card_frame_without_transform;

        let animated_container = {
            let mut t = tree.borrow_mut();
            let start = t.untransformed_frame_on_screen(detail_view)?;
            let animated_container = t.create_view("animated_container", start);
            t.add_subview(ctx.container(), animated_container)?;
            t.add_subview(animated_container, detail_view)?;
            t.set_frame(detail_view, start.bounds())?;

            trace_animating_view(self.config.debug_animating_views, &t, animated_container);
            trace_animating_view(self.config.debug_animating_views, &t, detail_view);
            animated_container
        };
        self.detail.set_font_state_highlighted(false);

        let driver = PropertyAnimator::new(
            self.scheduler.clone(),
            self.transition_duration(),
            TimingCurve::spring(self.config.dismissal_damping),
        )?;
        for (property, to) in [
            (ViewProperty::X, target.x()),
            (ViewProperty::Y, target.y()),
            (ViewProperty::Width, target.width()),
            (ViewProperty::Height, target.height()),
        ] {
            driver.add_animation(animated_container, property, to)?;
        }
        driver.add_animation(detail_view, ViewProperty::Width, target.width())?;
        driver.add_animation(detail_view, ViewProperty::Height, target.height())?;
        driver.add_animation(detail_view, ViewProperty::Scale, 1.0)?;
        if let Some(scroll) = detail.scroll {
            driver.add_animation_with(
                scroll,
                ViewProperty::ContentOffsetY,
                0.0,
                TrackTiming::nested(SCROLL_RESET_RELATIVE_DURATION, TimingCurve::Linear),
            )?;
        }

        let ctx = ctx.clone();
        let screen = self.detail.clone();
        let cell = self.params.from_cell;
        driver.add_completion(move |position| {
            let success = !ctx.transition_was_cancelled();
            if let Err(err) = finish_dismissal(
                ctx.tree(),
                ctx.container(),
                animated_container,
                detail_view,
                cell,
                success,
            ) {
                tracing::error!(%err, "failed to clean up card dismissal");
            }
            if !success {
                screen.set_font_state_highlighted(true);
            }
            tracing::debug!(?position, success, "card dismissal finished");
            ctx.complete_transition(success);
        })?;

        driver.start()?;
        tracing::debug!(
            duration = self.transition_duration(),
            damping = self.config.dismissal_damping,
            "card dismissal started"
        );
        self.driver = Some(driver);
        Ok(())
    }

    fn interruptible_animator(&self) -> Option<PropertyAnimator> {
        self.driver.clone()
    }

    fn animation_ended(&mut self, completed: bool) {
        self.driver = None;
        tracing::trace!(completed, "dismiss animator released");
    }
}

/// Tear down the temporary container. On success the detail view leaves the
/// tree and the cell shows again; otherwise the detail view goes back to
/// full screen.
fn finish_dismissal(
    tree: &SharedViewTree,
    container: ViewId,
    animated_container: ViewId,
    detail_view: ViewId,
    cell: ViewId,
    success: bool,
) -> folio_core::Result<()> {
    let mut tree = tree.borrow_mut();
    if success {
        tree.remove_from_parent(detail_view)?;
        tree.set_hidden(cell, false)?;
    } else {
        let bounds = tree.frame(container)?.bounds();
        tree.add_subview(container, detail_view)?;
        tree.set_frame(detail_view, bounds)?;
        tree.set_scale(detail_view, 1.0)?;
        tree.set_corner_radius(detail_view, 0.0)?;
    }
    tree.destroy_view(animated_container)
}
