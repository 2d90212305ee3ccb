//! Animation scheduler and property animators
//!
//! The scheduler owns every live property animator and advances the running
//! ones each frame, writing interpolated values into the shared view tree.
//! Animators are created through the [`PropertyAnimator`] wrapper, which
//! registers itself implicitly and exposes the interactive controls used by
//! transitions: pause, scrub (`fraction_complete`), reverse, stop and finish.
//!
//! # Completions
//!
//! Completion handlers are queued when an animator reaches a terminal
//! position and run by the scheduler after it has released its own state,
//! either at the end of [`AnimationScheduler::tick`] or from
//! [`AnimationScheduler::flush_completions`]. A handler therefore never runs
//! inside the call that finished the animator, and it is free to drive other
//! animators or mutate the view tree.
//!
//! ```ignore
//! let scheduler = AnimationScheduler::new(tree.clone());
//! let animator = PropertyAnimator::new(scheduler.handle(), 0.5, TimingCurve::spring(0.8))?;
//! animator.add_animation(card, ViewProperty::Y, 0.0)?;
//! animator.add_completion(|position| println!("done at {position:?}"))?;
//! animator.start()?;
//!
//! while scheduler.tick(1.0 / 60.0) {}
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_core::{SharedViewTree, ViewId, ViewProperty};
use slotmap::{new_key_type, Key, SlotMap};

use crate::error::{AnimationError, Result};
use crate::timing::{TimingCurve, TrackTiming};

new_key_type! {
    /// Handle to a registered property animator
    pub struct AnimatorId;
}

impl AnimatorId {
    /// Convert to raw u64 for log fields
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }
}

/// Where an animator ended up when it finished
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatingPosition {
    /// Values are at their starting point (reversed run)
    Start,
    /// Values are at their targets
    End,
    /// Values were left wherever the animator was stopped
    Current,
}

/// Lifecycle of a property animator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatorState {
    /// Configured but never started, paused or scrubbed
    Inactive,
    /// Advancing on the scheduler's clock
    Running,
    /// Frozen at `fraction_complete`; can be scrubbed
    Paused,
    /// Stopped without finishing; awaiting `finish`
    Stopped,
    /// Terminal. Completions have been queued exactly once.
    Finished(AnimatingPosition),
}

impl AnimatorState {
    pub fn is_finished(&self) -> bool {
        matches!(self, AnimatorState::Finished(_))
    }

    /// Running, paused or stopped
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AnimatorState::Running | AnimatorState::Paused | AnimatorState::Stopped
        )
    }
}

/// Completion handler, called once with the finishing position
pub type Completion = Box<dyn FnOnce(AnimatingPosition)>;

// ============================================================================
// Internal state
// ============================================================================

struct PropertyTrack {
    view: ViewId,
    property: ViewProperty,
    from: f32,
    to: f32,
    timing: TrackTiming,
}

impl PropertyTrack {
    fn value_at(&self, fraction: f32, curve: TimingCurve) -> f32 {
        let local = self.timing.local_fraction(fraction);
        let eased = self.timing.curve.unwrap_or(curve).apply(local);
        self.from + (self.to - self.from) * eased
    }
}

type PropertyWrite = (ViewId, ViewProperty, f32);

struct AnimatorEntry {
    duration: f32,
    curve: TimingCurve,
    tracks: Vec<PropertyTrack>,
    state: AnimatorState,
    fraction: f32,
    reversed: bool,
    completions: Vec<Completion>,
    /// Dead once every `PropertyAnimator` handle has been dropped
    owner: Weak<()>,
}

impl AnimatorEntry {
    fn writes(&self) -> Vec<PropertyWrite> {
        self.tracks
            .iter()
            .map(|t| (t.view, t.property, t.value_at(self.fraction, self.curve)))
            .collect()
    }

    /// Advance on the clock, returning the terminal position when reached
    fn advance(&mut self, dt: f32) -> Option<AnimatingPosition> {
        let step = if self.duration > 0.0 {
            dt / self.duration
        } else {
            f32::INFINITY
        };
        if self.reversed {
            self.fraction = (self.fraction - step).max(0.0);
            (self.fraction <= 0.0).then_some(AnimatingPosition::Start)
        } else {
            self.fraction = (self.fraction + step).min(1.0);
            (self.fraction >= 1.0).then_some(AnimatingPosition::End)
        }
    }

    fn finish(
        &mut self,
        position: AnimatingPosition,
        pending: &mut Vec<(Completion, AnimatingPosition)>,
    ) {
        self.state = AnimatorState::Finished(position);
        pending.extend(self.completions.drain(..).map(|c| (c, position)));
    }
}

struct SchedulerInner {
    animators: SlotMap<AnimatorId, AnimatorEntry>,
    pending: Vec<(Completion, AnimatingPosition)>,
    tree: SharedViewTree,
}

fn apply_writes(tree: &SharedViewTree, writes: Vec<PropertyWrite>) {
    let mut tree = tree.borrow_mut();
    for (view, property, value) in writes {
        // Views torn down mid-flight simply stop receiving values
        if let Err(err) = tree.set_property(view, property, value) {
            tracing::trace!(?property, %err, "skipping animated write");
        }
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// The animation scheduler that ticks all running property animators
///
/// Everything runs on the UI thread; the scheduler is ticked explicitly with
/// the frame delta by whoever owns the frame loop.
pub struct AnimationScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl AnimationScheduler {
    pub fn new(tree: SharedViewTree) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                animators: SlotMap::with_key(),
                pending: Vec::new(),
                tree,
            })),
        }
    }

    /// Get a weak handle for registering animators
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// The view tree this scheduler writes into
    pub fn tree(&self) -> SharedViewTree {
        self.inner.borrow().tree.clone()
    }

    /// Advance all running animators by `dt` seconds
    ///
    /// Returns true if any animator is still running (needs another tick).
    pub fn tick(&self, dt: f32) -> bool {
        self.flush_completions();

        let (writes, tree) = {
            let mut guard = self.inner.borrow_mut();
            let SchedulerInner {
                animators,
                pending,
                tree,
            } = &mut *guard;

            let mut writes = Vec::new();
            for (id, entry) in animators.iter_mut() {
                if entry.state != AnimatorState::Running {
                    continue;
                }
                let terminal = entry.advance(dt);
                writes.extend(entry.writes());
                if let Some(position) = terminal {
                    tracing::trace!(animator = id.to_raw(), ?position, "animator finished");
                    entry.finish(position, pending);
                }
            }

            // Animators are only dropped once no handle refers to them and
            // they are not running on their own
            animators.retain(|_, e| {
                e.owner.strong_count() > 0 || e.state == AnimatorState::Running
            });

            (writes, tree.clone())
        };

        apply_writes(&tree, writes);
        self.flush_completions();
        self.has_active_animations()
    }

    /// Run queued completion handlers until none remain
    pub fn flush_completions(&self) {
        loop {
            let pending = std::mem::take(&mut self.inner.borrow_mut().pending);
            if pending.is_empty() {
                break;
            }
            for (completion, position) in pending {
                completion(position);
            }
        }
    }

    /// Tick with a fixed `dt` until nothing is running, up to `max_frames`
    ///
    /// Returns the number of frames ticked.
    pub fn run_until_idle(&self, dt: f32, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames {
            frames += 1;
            if !self.tick(dt) {
                break;
            }
        }
        frames
    }

    /// Check if any animator is still running
    pub fn has_active_animations(&self) -> bool {
        self.inner
            .borrow()
            .animators
            .iter()
            .any(|(_, e)| e.state == AnimatorState::Running)
    }

    /// Number of registered animators (running or not)
    pub fn animator_count(&self) -> usize {
        self.inner.borrow().animators.len()
    }
}

/// A weak handle to the animation scheduler
///
/// Passed to components that create animators. It won't keep the scheduler
/// alive.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    fn upgrade(&self) -> Result<Rc<RefCell<SchedulerInner>>> {
        self.inner.upgrade().ok_or(AnimationError::SchedulerDropped)
    }
}

// ============================================================================
// Property Animator
// ============================================================================

/// A pausable, scrubbable, reversible animation of view properties
///
/// Cloning yields another handle to the same animator. The animator stays
/// registered while any handle is alive or while it is running.
#[derive(Clone)]
pub struct PropertyAnimator {
    handle: SchedulerHandle,
    id: AnimatorId,
    duration: f32,
    _owner: Rc<()>,
}

impl std::fmt::Debug for PropertyAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyAnimator")
            .field("id", &self.id)
            .field("duration", &self.duration)
            .field("state", &self.state())
            .finish()
    }
}

impl PropertyAnimator {
    /// Register a new, inactive animator
    pub fn new(handle: SchedulerHandle, duration: f32, curve: TimingCurve) -> Result<Self> {
        let owner = Rc::new(());
        let inner = handle.upgrade()?;
        let id = inner.borrow_mut().animators.insert(AnimatorEntry {
            duration: duration.max(0.0),
            curve,
            tracks: Vec::new(),
            state: AnimatorState::Inactive,
            fraction: 0.0,
            reversed: false,
            completions: Vec::new(),
            owner: Rc::downgrade(&owner),
        });
        tracing::trace!(animator = id.to_raw(), duration, ?curve, "animator registered");
        Ok(Self {
            handle,
            id,
            duration: duration.max(0.0),
            _owner: owner,
        })
    }

    pub fn id(&self) -> AnimatorId {
        self.id
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Run `f` against this animator's entry and the scheduler's queues
    fn with_entry<R>(
        &self,
        f: impl FnOnce(&mut AnimatorEntry, &mut Vec<(Completion, AnimatingPosition)>, &SharedViewTree) -> Result<R>,
    ) -> Result<R> {
        let inner = self.handle.upgrade()?;
        let mut guard = inner.borrow_mut();
        let SchedulerInner {
            animators,
            pending,
            tree,
        } = &mut *guard;
        let entry = animators
            .get_mut(self.id)
            .ok_or(AnimationError::SchedulerDropped)?;
        f(entry, pending, tree)
    }

    /// Animate `property` of `view` from its current value to `to`
    pub fn add_animation(&self, view: ViewId, property: ViewProperty, to: f32) -> Result<()> {
        self.add_animation_with(view, property, to, TrackTiming::default())
    }

    /// Animate with explicit track timing (e.g. a shorter nested track)
    ///
    /// The starting value is read from the tree now. Tracks can only be added
    /// while the animator is inactive.
    pub fn add_animation_with(
        &self,
        view: ViewId,
        property: ViewProperty,
        to: f32,
        timing: TrackTiming,
    ) -> Result<()> {
        self.with_entry(|entry, _, tree| {
            if entry.state != AnimatorState::Inactive {
                return Err(AnimationError::InvalidState {
                    op: "add_animation",
                    state: entry.state,
                });
            }
            let from = tree.borrow().property(view, property)?;
            entry.tracks.push(PropertyTrack {
                view,
                property,
                from,
                to,
                timing,
            });
            Ok(())
        })
    }

    /// Register a completion handler. It runs once, when the animator
    /// reaches a terminal position.
    pub fn add_completion<F>(&self, completion: F) -> Result<()>
    where
        F: FnOnce(AnimatingPosition) + 'static,
    {
        self.with_entry(|entry, _, _| {
            if entry.state.is_finished() {
                return Err(AnimationError::InvalidState {
                    op: "add_completion",
                    state: entry.state,
                });
            }
            entry.completions.push(Box::new(completion));
            Ok(())
        })
    }

    /// Start (or resume) running on the scheduler's clock
    pub fn start(&self) -> Result<()> {
        self.with_entry(|entry, _, _| match entry.state {
            AnimatorState::Inactive | AnimatorState::Paused => {
                entry.state = AnimatorState::Running;
                tracing::trace!(
                    animator = self.id.to_raw(),
                    fraction = entry.fraction,
                    reversed = entry.reversed,
                    "animator started"
                );
                Ok(())
            }
            AnimatorState::Running => Ok(()),
            state => Err(AnimationError::InvalidState { op: "start", state }),
        })
    }

    /// Freeze at the current fraction. Pausing an inactive animator applies
    /// its starting values.
    pub fn pause(&self) -> Result<()> {
        let (writes, tree) = self.with_entry(|entry, _, tree| match entry.state {
            AnimatorState::Inactive | AnimatorState::Running => {
                entry.state = AnimatorState::Paused;
                Ok((entry.writes(), tree.clone()))
            }
            AnimatorState::Paused => Ok((Vec::new(), tree.clone())),
            state => Err(AnimationError::InvalidState { op: "pause", state }),
        })?;
        apply_writes(&tree, writes);
        Ok(())
    }

    /// Scrub to `fraction` (clamped to [0, 1]) and apply the values
    ///
    /// Only valid while paused; an inactive animator is paused first.
    pub fn set_fraction_complete(&self, fraction: f32) -> Result<()> {
        let (writes, tree) = self.with_entry(|entry, _, tree| match entry.state {
            AnimatorState::Inactive | AnimatorState::Paused => {
                entry.state = AnimatorState::Paused;
                entry.fraction = fraction.clamp(0.0, 1.0);
                Ok((entry.writes(), tree.clone()))
            }
            state => Err(AnimationError::InvalidState {
                op: "set_fraction_complete",
                state,
            }),
        })?;
        apply_writes(&tree, writes);
        Ok(())
    }

    pub fn fraction_complete(&self) -> f32 {
        self.with_entry(|entry, _, _| Ok(entry.fraction))
            .unwrap_or(0.0)
    }

    /// Run toward the start instead of the end when next started
    pub fn set_reversed(&self, reversed: bool) -> Result<()> {
        self.with_entry(|entry, _, _| match entry.state {
            AnimatorState::Stopped | AnimatorState::Finished(_) => {
                Err(AnimationError::InvalidState {
                    op: "set_reversed",
                    state: entry.state,
                })
            }
            _ => {
                entry.reversed = reversed;
                Ok(())
            }
        })
    }

    pub fn is_reversed(&self) -> bool {
        self.with_entry(|entry, _, _| Ok(entry.reversed))
            .unwrap_or(false)
    }

    /// Stop at the current values
    ///
    /// With `without_finishing = false` the animator moves to `Stopped` and
    /// must be finished with [`PropertyAnimator::finish`]. With `true` it
    /// finishes immediately at [`AnimatingPosition::Current`], so registered
    /// completions still run exactly once.
    pub fn stop(&self, without_finishing: bool) -> Result<()> {
        self.with_entry(|entry, pending, _| {
            if entry.state.is_finished() || entry.state == AnimatorState::Stopped {
                return Err(AnimationError::InvalidState {
                    op: "stop",
                    state: entry.state,
                });
            }
            if without_finishing {
                entry.finish(AnimatingPosition::Current, pending);
            } else {
                entry.state = AnimatorState::Stopped;
            }
            Ok(())
        })
    }

    /// Finish a stopped animator, jumping its values to `position`
    pub fn finish(&self, position: AnimatingPosition) -> Result<()> {
        let (writes, tree) = self.with_entry(|entry, pending, tree| {
            if entry.state != AnimatorState::Stopped {
                return Err(AnimationError::InvalidState {
                    op: "finish",
                    state: entry.state,
                });
            }
            match position {
                AnimatingPosition::Start => entry.fraction = 0.0,
                AnimatingPosition::End => entry.fraction = 1.0,
                AnimatingPosition::Current => {}
            }
            let writes = entry.writes();
            entry.finish(position, pending);
            tracing::trace!(animator = self.id.to_raw(), ?position, "animator force-finished");
            Ok((writes, tree.clone()))
        })?;
        apply_writes(&tree, writes);
        Ok(())
    }

    /// Current state. Reports `Inactive` once the scheduler is gone.
    pub fn state(&self) -> AnimatorState {
        self.with_entry(|entry, _, _| Ok(entry.state))
            .unwrap_or(AnimatorState::Inactive)
    }

    pub fn is_running(&self) -> bool {
        self.state() == AnimatorState::Running
    }
}
