//! Maps lifecycle events to instance states.
//! Events that make no sense in the current state yield `None` and are ignored.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    Mounting,
    Mounted,
    /// The last mount attempt stopped at the factory; nothing is displayed.
    Failed,
    Unmounted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Constructed => write!(f, "constructed"),
            LifecycleState::Mounting => write!(f, "mounting"),
            LifecycleState::Mounted => write!(f, "mounted"),
            LifecycleState::Failed => write!(f, "failed"),
            LifecycleState::Unmounted => write!(f, "unmounted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Host attached to the environment.
    Attach,
    FactoryFailed,
    HooksSettled,
    Detach,
}

pub fn next_state(current: LifecycleState, event: LifecycleEvent) -> Option<LifecycleState> {
    use LifecycleEvent::*;
    use LifecycleState::*;

    match (current, event) {
        (Constructed | Unmounted | Failed, Attach) => Some(Mounting),
        (Mounting, FactoryFailed) => Some(Failed),
        (Mounting, HooksSettled) => Some(Mounted),
        (Mounted | Failed, Detach) => Some(Unmounted),
        _ => None,
    }
}
