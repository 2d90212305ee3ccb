//! Transition coordinator
//!
//! [`CardTransition`] owns everything one tapped card needs: the geometry
//! snapshot, the detail screen and both animators. It runs at most one
//! transition at a time and keeps the active context only until that
//! transition reports completion.

use std::rc::Rc;

use folio_animation::{PropertyAnimator, SchedulerHandle};
use folio_core::SharedViewTree;
use folio_platform::ScreenLifecycle;

use crate::animator::TransitionAnimator;
use crate::config::TransitionConfig;
use crate::context::{ScreenViews, TransitionContext, TransitionDirection};
use crate::detail::CardDetailScreen;
use crate::dismiss::DismissCardAnimator;
use crate::error::{Result, TransitionError};
use crate::present::PresentCardAnimator;
use crate::snapshot::{TapInfo, TransitionParams};
use crate::status_bar::StatusBarAnimatable;

/// How a finished transition ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub direction: TransitionDirection,
    pub completed: bool,
}

/// Card-to-detail transition for one tapped card
pub struct CardTransition {
    tree: SharedViewTree,
    params: Rc<TransitionParams>,
    presenting: ScreenViews,
    detail: CardDetailScreen,
    present: PresentCardAnimator,
    dismiss: DismissCardAnimator,
    active: Option<TransitionContext>,
}

impl CardTransition {
    /// Snapshot the tapped card and build its detail screen
    ///
    /// `presenting` is the card list screen the detail is presented over.
    /// Nothing moves until [`CardTransition::begin`] is called.
    pub fn present_from_tap(
        tree: SharedViewTree,
        scheduler: SchedulerHandle,
        config: TransitionConfig,
        presenting: ScreenViews,
        tap: TapInfo,
    ) -> Result<Self> {
        config.validate()?;
        let (params, screen_height) = {
            let t = tree.borrow();
            (
                TransitionParams::capture(&t, tap.cell, tap.content)?,
                t.screen_bounds().height(),
            )
        };
        let params = Rc::new(params);

        let detail = CardDetailScreen::new(
            tree.clone(),
            scheduler.clone(),
            config.clone(),
            params.content.highlighted(),
            params.content.clone(),
        )?;
        let present = PresentCardAnimator::new(
            params.clone(),
            config.clone(),
            scheduler.clone(),
            screen_height,
        );
        let dismiss = DismissCardAnimator::new(params.clone(), config, scheduler, detail.clone());

        Ok(Self {
            tree,
            params,
            presenting,
            detail,
            present,
            dismiss,
            active: None,
        })
    }

    pub fn detail(&self) -> &CardDetailScreen {
        &self.detail
    }

    pub fn params(&self) -> &TransitionParams {
        &self.params
    }

    pub fn present_animator(&self) -> &PresentCardAnimator {
        &self.present
    }

    /// The screen whose status bar preferences apply while presented
    pub fn status_bar_source(&self) -> &dyn StatusBarAnimatable {
        &self.detail
    }

    /// Select the animator governing a direction
    pub fn animator_for(&mut self, direction: TransitionDirection) -> &mut dyn TransitionAnimator {
        match direction {
            TransitionDirection::Present => &mut self.present,
            TransitionDirection::Dismiss => &mut self.dismiss,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_direction(&self) -> Option<TransitionDirection> {
        self.active.as_ref().map(TransitionContext::direction)
    }

    /// Start a transition in `direction`
    pub fn begin(&mut self, direction: TransitionDirection) -> Result<TransitionContext> {
        self.start(direction, false)
    }

    /// Start a transition that a gesture scrubs through
    /// [`CardTransition::interruptible_animator`]
    ///
    /// The driver stays paused until [`CardTransition::end_interaction`].
    pub fn begin_interactive(&mut self, direction: TransitionDirection) -> Result<TransitionContext> {
        self.start(direction, true)
    }

    /// Hand an interactive transition back to time. A cancelled interaction
    /// runs the driver back to its start and the transition fails.
    pub fn end_interaction(&self, cancelled: bool) -> Result<()> {
        let Some(ctx) = self.active.as_ref().filter(|ctx| ctx.is_interactive()) else {
            return Ok(());
        };
        ctx.end_interaction(cancelled);
        if let Some(driver) = self.interruptible_animator() {
            driver.pause()?;
            driver.set_reversed(cancelled)?;
            driver.start()?;
        }
        tracing::debug!(direction = ?ctx.direction(), cancelled, "interaction ended");
        Ok(())
    }

    fn start(
        &mut self,
        direction: TransitionDirection,
        interactive: bool,
    ) -> Result<TransitionContext> {
        if let Some(active) = &self.active {
            return Err(TransitionError::AlreadyInFlight(active.direction()));
        }

        let container = self.tree.borrow().root();
        let (from, to) = match direction {
            TransitionDirection::Present => (self.presenting, self.detail.views()),
            TransitionDirection::Dismiss => (self.detail.views(), self.presenting),
        };
        let ctx = TransitionContext::new(self.tree.clone(), container, direction, from, to);
        ctx.set_transition_duration(self.animator_for(direction).transition_duration());
        if interactive {
            ctx.begin_interaction();
        }

        if direction == TransitionDirection::Present {
            let mut detail = self.detail.clone();
            detail.set_presenting_context(Some(ctx.clone()));
            detail.on_will_appear(true);
        }

        if let Err(err) = self.animator_for(direction).animate_transition(&ctx) {
            if direction == TransitionDirection::Present {
                self.restore_cell();
            }
            return Err(err);
        }
        if interactive {
            if let Some(driver) = self.animator_for(direction).interruptible_animator() {
                driver.pause()?;
            }
        }
        tracing::debug!(
            ?direction,
            interactive,
            duration = ctx.transition_duration(),
            "transition began"
        );
        self.active = Some(ctx.clone());
        Ok(ctx)
    }

    /// Mark the active transition as cancelled by the platform
    pub fn cancel(&self) {
        if let Some(ctx) = &self.active {
            ctx.cancel();
        }
    }

    /// The driver of the active transition
    pub fn interruptible_animator(&self) -> Option<PropertyAnimator> {
        match self.active_direction()? {
            TransitionDirection::Present => self.present.interruptible_animator(),
            TransitionDirection::Dismiss => self.dismiss.interruptible_animator(),
        }
    }

    /// Observe completion of the active transition and start a dismissal
    /// requested by a committed drag
    ///
    /// Call after each scheduler tick. Returns the outcome of a transition
    /// that finished since the last poll.
    pub fn poll(&mut self) -> Result<Option<TransitionOutcome>> {
        let outcome = self.poll_active()?;
        if self.active.is_none() && self.detail.take_dismiss_request() {
            self.begin(TransitionDirection::Dismiss)?;
        }
        Ok(outcome)
    }

    fn poll_active(&mut self) -> Result<Option<TransitionOutcome>> {
        let Some(completed) = self.active.as_ref().and_then(TransitionContext::completion) else {
            return Ok(None);
        };
        let Some(ctx) = self.active.take() else {
            return Ok(None);
        };
        let direction = ctx.direction();
        self.animator_for(direction).animation_ended(completed);

        match (direction, completed) {
            (TransitionDirection::Present, false) => {
                self.tree
                    .borrow_mut()
                    .remove_from_parent(self.detail.root_view())?;
                self.restore_cell();
            }
            (TransitionDirection::Dismiss, true) => {
                let mut detail = self.detail.clone();
                detail.on_did_disappear(true);
            }
            _ => {}
        }
        tracing::debug!(?direction, completed, "transition ended");
        Ok(Some(TransitionOutcome {
            direction,
            completed,
        }))
    }

    fn restore_cell(&self) {
        if let Err(err) = self
            .tree
            .borrow_mut()
            .set_hidden(self.params.from_cell, false)
        {
            tracing::warn!(%err, "could not restore source cell");
        }
    }
}
