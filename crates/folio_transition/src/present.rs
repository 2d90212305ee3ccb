//! Card presentation: a spring that lifts the card into place while it
//! expands to fill the screen
//!
//! The detail screen's root view is moved into a temporary full-screen
//! container whose top starts at the card's position. One spring driver
//! carries the container up to the top of the screen; a nested linear track
//! over the first part of the duration grows the detail view from the card's
//! size to the container's and flattens its corners.

use std::rc::Rc;

use folio_animation::{PropertyAnimator, SchedulerHandle, TimingCurve, TrackTiming};
use folio_core::{Rect, SharedViewTree, ViewId, ViewProperty};

use crate::animator::{trace_animating_view, TransitionAnimator};
use crate::config::{TransitionConfig, VerticalExpandingStyle};
use crate::context::TransitionContext;
use crate::error::Result;
use crate::snapshot::TransitionParams;

/// Spring of a card presentation, derived from how far the card travels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringParameters {
    pub damping: f32,
    /// Seconds
    pub duration: f32,
}

impl SpringParameters {
    /// Cards near the top settle critically damped in the baseline duration;
    /// cards further away bounce a little and take longer.
    pub fn for_card(from: Rect, screen_height: f32, config: &TransitionConfig) -> Self {
        let distance = from.min_y().abs();
        let extent = if from.min_y() < 0.0 {
            from.height()
        } else {
            screen_height
        };
        let damping = if extent > 0.0 {
            1.0 - config.damping_interval * (distance / extent)
        } else {
            1.0
        };

        let travel = if screen_height > 0.0 {
            (distance / screen_height).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let duration =
            config.baseline_duration + (config.max_duration - config.baseline_duration) * travel;

        Self { damping, duration }
    }
}

/// Non-interactive forward transition from a card to its detail screen
pub struct PresentCardAnimator {
    params: Rc<TransitionParams>,
    config: TransitionConfig,
    scheduler: SchedulerHandle,
    spring: SpringParameters,
    driver: Option<PropertyAnimator>,
}

impl PresentCardAnimator {
    pub fn new(
        params: Rc<TransitionParams>,
        config: TransitionConfig,
        scheduler: SchedulerHandle,
        screen_height: f32,
    ) -> Self {
        let spring = SpringParameters::for_card(params.from_card_frame, screen_height, &config);
        Self {
            params,
            config,
            scheduler,
            spring,
            driver: None,
        }
    }

    pub fn spring(&self) -> SpringParameters {
        self.spring
    }
}

impl TransitionAnimator for PresentCardAnimator {
    fn transition_duration(&self) -> f32 {
        self.spring.duration
    }

    fn animate_transition(&mut self, ctx: &TransitionContext) -> Result<()> {
        let tree = ctx.tree().clone();
        let from = self.params.from_card_frame;
        let detail = ctx.to_views();
        let detail_view = detail.root;
        let style = self.config.vertical_expanding_style;

        let (animated_container, bounds) = {
            let mut t = tree.borrow_mut();
            let bounds = t.frame(ctx.container())?.bounds();

            let container_top = match style {
                VerticalExpandingStyle::FromTop => from.min_y(),
                VerticalExpandingStyle::FromCenter => {
                    from.min_y() + from.height() / 2.0 - bounds.height() / 2.0
                }
            };
            let animated_container = t.create_view(
                "animated_container",
                Rect::new(0.0, container_top, bounds.width(), bounds.height()),
            );
            t.add_subview(ctx.container(), animated_container)?;

            // The card starts at its on-screen size, horizontally centered
            let card_y = match style {
                VerticalExpandingStyle::FromTop => 0.0,
                VerticalExpandingStyle::FromCenter => (bounds.height() - from.height()) / 2.0,
            };
            t.add_subview(animated_container, detail_view)?;
            t.set_frame(
                detail_view,
                Rect::new(
                    (bounds.width() - from.width()) / 2.0,
                    card_y,
                    from.width(),
                    from.height(),
                ),
            )?;
            t.set_corner_radius(detail_view, self.config.card_corner_radius)?;
            t.set_scale(detail_view, 1.0)?;

            t.set_hidden(self.params.from_cell, true)?;
            t.set_scale(self.params.from_cell, 1.0)?;

            trace_animating_view(self.config.debug_animating_views, &t, animated_container);
            trace_animating_view(self.config.debug_animating_views, &t, detail_view);
            (animated_container, bounds)
        };

        let driver = PropertyAnimator::new(
            self.scheduler.clone(),
            self.spring.duration,
            TimingCurve::spring(self.spring.damping),
        )?;

        // Bounce the container up on the spring
        driver.add_animation(animated_container, ViewProperty::Y, 0.0)?;

        // Grow the card to fill the container, linearly
        let expanding =
            TrackTiming::nested(self.config.expansion_relative_duration, TimingCurve::Linear);
        for (property, to) in [
            (ViewProperty::Width, bounds.width()),
            (ViewProperty::Height, bounds.height()),
            (ViewProperty::X, 0.0),
            (ViewProperty::Y, 0.0),
            (ViewProperty::CornerRadius, 0.0),
        ] {
            driver.add_animation_with(detail_view, property, to, expanding)?;
        }

        let ctx = ctx.clone();
        let scroll = detail.scroll;
        driver.add_completion(move |position| {
            if let Err(err) = finish_presentation(
                ctx.tree(),
                ctx.container(),
                animated_container,
                detail_view,
                scroll,
            ) {
                tracing::error!(%err, "failed to clean up card presentation");
            }
            let success = !ctx.transition_was_cancelled();
            tracing::debug!(?position, success, "card presentation finished");
            ctx.complete_transition(success);
        })?;

        driver.start()?;
        tracing::debug!(
            damping = self.spring.damping,
            duration = self.spring.duration,
            ?style,
            "card presentation started"
        );
        self.driver = Some(driver);
        Ok(())
    }

    fn interruptible_animator(&self) -> Option<PropertyAnimator> {
        self.driver.clone()
    }

    fn animation_ended(&mut self, completed: bool) {
        self.driver = None;
        tracing::trace!(completed, "present animator released");
    }
}

/// Move the detail view into the transition container at full size and drop
/// the temporary container
fn finish_presentation(
    tree: &SharedViewTree,
    container: ViewId,
    animated_container: ViewId,
    detail_view: ViewId,
    scroll: Option<ViewId>,
) -> folio_core::Result<()> {
    let mut tree = tree.borrow_mut();
    let bounds = tree.frame(container)?.bounds();
    tree.add_subview(container, detail_view)?;
    tree.set_frame(detail_view, bounds)?;
    tree.set_corner_radius(detail_view, 0.0)?;
    tree.destroy_view(animated_container)?;
    if let Some(scroll) = scroll {
        tree.scroll_metrics_mut(scroll)?.scroll_enabled = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEIGHT: f32 = 812.0;

    #[test]
    fn test_card_at_top_is_critically_damped() {
        let spring = SpringParameters::for_card(
            Rect::new(20.0, 0.0, 335.0, 402.0),
            HEIGHT,
            &TransitionConfig::standard(),
        );
        assert_eq!(spring.damping, 1.0);
        assert_eq!(spring.duration, 0.5);
    }

    #[test]
    fn test_card_fully_above_uses_its_height() {
        let spring = SpringParameters::for_card(
            Rect::new(0.0, -HEIGHT, 375.0, HEIGHT),
            HEIGHT,
            &TransitionConfig::standard(),
        );
        assert!((spring.damping - 0.7).abs() < 1e-6);
        assert!((spring.duration - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_parameters_stay_in_range() {
        let config = TransitionConfig::standard();
        for i in -10..=10 {
            let min_y = HEIGHT * i as f32 / 10.0;
            let spring = SpringParameters::for_card(
                Rect::new(0.0, min_y, 375.0, HEIGHT),
                HEIGHT,
                &config,
            );
            assert!(spring.damping >= 0.7 - 1e-6 && spring.damping <= 1.0);
            assert!(spring.duration >= 0.5 && spring.duration <= 0.9 + 1e-6);
        }
    }

    #[test]
    fn test_far_card_duration_is_clamped() {
        let spring = SpringParameters::for_card(
            Rect::new(0.0, 3.0 * HEIGHT, 375.0, 400.0),
            HEIGHT,
            &TransitionConfig::standard(),
        );
        assert!((spring.duration - 0.9).abs() < 1e-6);
    }
}
