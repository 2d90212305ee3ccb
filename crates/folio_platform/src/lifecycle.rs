//! Screen lifecycle hooks

/// Appearance events delivered to a screen by whoever presents it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The screen is about to become visible
    WillAppear { animated: bool },
    /// The screen has been removed from view
    DidDisappear { animated: bool },
}

/// Lifecycle hooks a screen type overrides directly
///
/// Every hook has an empty default, so a screen only implements the ones it
/// cares about.
pub trait ScreenLifecycle {
    fn on_will_appear(&mut self, _animated: bool) {}

    fn on_did_disappear(&mut self, _animated: bool) {}

    /// Route a lifecycle event to the matching hook
    fn handle_lifecycle(&mut self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::WillAppear { animated } => self.on_will_appear(animated),
            LifecycleEvent::DidDisappear { animated } => self.on_did_disappear(animated),
        }
    }
}
