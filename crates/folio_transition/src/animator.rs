//! The interface shared by the present and dismiss animators

use folio_animation::PropertyAnimator;

use crate::context::TransitionContext;
use crate::error::Result;

/// Drives one direction of a card transition
pub trait TransitionAnimator {
    /// Duration of the transition in seconds
    fn transition_duration(&self) -> f32;

    /// Set up temporary views and start the animation. The animator reports
    /// back through [`TransitionContext::complete_transition`].
    fn animate_transition(&mut self, ctx: &TransitionContext) -> Result<()>;

    /// The driver of the running transition, if any
    fn interruptible_animator(&self) -> Option<PropertyAnimator> {
        None
    }

    /// Called once the transition has completed; releases the driver
    fn animation_ended(&mut self, _completed: bool) {}
}

/// Trace a temporary view when debugging animations
pub(crate) fn trace_animating_view(
    enabled: bool,
    tree: &folio_core::ViewTree,
    view: folio_core::ViewId,
) {
    if !enabled {
        return;
    }
    if let Ok(node) = tree.node(view) {
        tracing::debug!(
            view = view.to_raw(),
            name = node.name,
            frame = ?node.frame,
            scale = node.scale,
            corner_radius = node.corner_radius,
            "animating view"
        );
    }
}
