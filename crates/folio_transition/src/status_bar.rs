//! Status bar bookkeeping for screens that animate the status bar

use std::cell::Cell;
use std::rc::Rc;

use crate::context::TransitionContext;

/// How the status bar animates when it shows or hides
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusBarAnimation {
    #[default]
    None,
    Fade,
    Slide,
}

/// What a screen wants from the status bar while it is visible
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusBarConfig {
    pub prefers_hidden: bool,
    pub animation: StatusBarAnimation,
    /// `None` uses the transition's duration
    pub animation_duration: Option<f32>,
    /// Wait until an interactive transition hands off to animation
    pub animates_after_interactivity_ends: bool,
}

impl StatusBarConfig {
    pub fn new(prefers_hidden: bool, animation: StatusBarAnimation) -> Self {
        Self {
            prefers_hidden,
            animation,
            animation_duration: None,
            animates_after_interactivity_ends: true,
        }
    }

    pub fn with_animation_duration(mut self, duration: f32) -> Self {
        self.animation_duration = Some(duration);
        self
    }
}

impl Default for StatusBarConfig {
    fn default() -> Self {
        Self::new(false, StatusBarAnimation::None)
    }
}

/// An applied status bar appearance change
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusBarUpdate {
    pub hidden: bool,
    pub animation: StatusBarAnimation,
    pub duration: f32,
}

/// Tracks whether a screen currently hides the status bar
#[derive(Clone, Debug, Default)]
pub struct StatusBarController {
    hidden: Rc<Cell<bool>>,
    system_hidden: bool,
    last_update: Rc<Cell<Option<StatusBarUpdate>>>,
}

impl StatusBarController {
    /// `system_hidden` is the app-wide value restored on disappear
    pub fn new(system_hidden: bool) -> Self {
        Self {
            hidden: Rc::new(Cell::new(system_hidden)),
            system_hidden,
            last_update: Rc::new(Cell::new(None)),
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }

    /// The most recent appearance change, if any
    pub fn last_update(&self) -> Option<StatusBarUpdate> {
        self.last_update.get()
    }

    /// Apply `config` as part of an appearing transition
    ///
    /// Without a transition context nothing changes. Interactive transitions
    /// defer the change until interactivity ends and skip it if the
    /// transition was cancelled.
    pub fn will_appear(&self, config: StatusBarConfig, ctx: Option<&TransitionContext>) {
        let Some(ctx) = ctx else {
            return;
        };
        let duration = config
            .animation_duration
            .unwrap_or_else(|| ctx.transition_duration());

        if config.animates_after_interactivity_ends && ctx.is_interactive() {
            let controller = self.clone();
            ctx.notify_when_interaction_ends(move |cancelled| {
                if !cancelled {
                    controller.apply(config, duration);
                }
            });
        } else {
            self.apply(config, duration);
        }
    }

    /// Fall back to the app-wide value
    pub fn did_disappear(&self) {
        self.hidden.set(self.system_hidden);
    }

    fn apply(&self, config: StatusBarConfig, duration: f32) {
        self.hidden.set(config.prefers_hidden);
        self.last_update.set(Some(StatusBarUpdate {
            hidden: config.prefers_hidden,
            animation: config.animation,
            duration,
        }));
        tracing::trace!(hidden = config.prefers_hidden, duration, "status bar updated");
    }
}

/// Capability implemented by screens that animate the status bar
pub trait StatusBarAnimatable {
    fn status_bar_config(&self) -> StatusBarConfig;

    fn status_bar(&self) -> &StatusBarController;

    fn prefers_status_bar_hidden(&self) -> bool {
        self.status_bar().is_hidden()
    }

    fn preferred_status_bar_animation(&self) -> StatusBarAnimation {
        self.status_bar_config().animation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ScreenViews, TransitionDirection};
    use folio_core::{Size, ViewTree};

    fn context() -> TransitionContext {
        let tree = ViewTree::shared(Size::new(100.0, 100.0));
        let root = tree.borrow().root();
        let views = ScreenViews { root, scroll: None };
        let ctx = TransitionContext::new(tree, root, TransitionDirection::Present, views, views);
        ctx.set_transition_duration(0.5);
        ctx
    }

    #[test]
    fn test_applies_alongside_non_interactive_transition() {
        let controller = StatusBarController::new(false);
        let config = StatusBarConfig::new(true, StatusBarAnimation::Slide);
        controller.will_appear(config, Some(&context()));

        assert!(controller.is_hidden());
        let update = controller.last_update().unwrap();
        assert_eq!(update.duration, 0.5);
        assert_eq!(update.animation, StatusBarAnimation::Slide);

        controller.did_disappear();
        assert!(!controller.is_hidden());
    }

    #[test]
    fn test_waits_for_interaction_and_skips_on_cancel() {
        let controller = StatusBarController::new(false);
        let config = StatusBarConfig::new(true, StatusBarAnimation::Fade).with_animation_duration(0.4);

        let ctx = context();
        ctx.begin_interaction();
        controller.will_appear(config, Some(&ctx));
        assert!(!controller.is_hidden());
        ctx.end_interaction(true);
        assert!(!controller.is_hidden());

        let ctx = context();
        ctx.begin_interaction();
        controller.will_appear(config, Some(&ctx));
        ctx.end_interaction(false);
        assert!(controller.is_hidden());
        assert_eq!(controller.last_update().map(|u| u.duration), Some(0.4));
    }

    #[test]
    fn test_no_context_is_a_no_op() {
        let controller = StatusBarController::new(true);
        controller.will_appear(StatusBarConfig::default(), None);
        assert!(controller.is_hidden());
        assert_eq!(controller.last_update(), None);
    }

    #[test]
    fn test_capability_reports_preferences() {
        struct Screen(StatusBarController);
        impl StatusBarAnimatable for Screen {
            fn status_bar_config(&self) -> StatusBarConfig {
                StatusBarConfig::new(true, StatusBarAnimation::Fade)
            }
            fn status_bar(&self) -> &StatusBarController {
                &self.0
            }
        }

        let screen = Screen(StatusBarController::new(false));
        assert!(!screen.prefers_status_bar_hidden());
        assert_eq!(screen.preferred_status_bar_animation(), StatusBarAnimation::Fade);
        screen
            .status_bar()
            .will_appear(screen.status_bar_config(), Some(&context()));
        assert!(screen.prefers_status_bar_hidden());
    }
}
