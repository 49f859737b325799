//! Per-instance activation state (§3 "Actor instance state").

// Layer 1: Standard library imports
use std::collections::HashSet;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
use crate::supervisor::RestartBackoff;
use crate::util::ActorRef;

/// Lifecycle state of one actor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Activating,
    Running,
    Deactivating,
    Dead,
}

/// Bookkeeping the activation registry keeps per instance, mutated only
/// by that instance's own dispatcher loop (§3 ownership semantics).
#[derive(Debug, Clone)]
pub struct ActorInstanceState {
    pub actor_ref: ActorRef,
    pub activation_state: ActivationState,
    pub last_activity: DateTime<Utc>,
    pub children: HashSet<ActorRef>,
    pub parent: Option<ActorRef>,
    pub restart_backoff: RestartBackoff,
    pub version: u64,
}

impl ActorInstanceState {
    pub fn new(actor_ref: ActorRef, parent: Option<ActorRef>, restart_backoff: RestartBackoff) -> Self {
        Self {
            actor_ref,
            activation_state: ActivationState::Activating,
            last_activity: Utc::now(), // §3.2
            children: HashSet::new(),
            parent,
            restart_backoff,
            version: 0,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now(); // §3.2
    }

    pub fn idle_for(&self) -> chrono::Duration {
        Utc::now() - self.last_activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    #[test]
    fn new_instance_starts_activating_with_no_children() {
        let state = ActorInstanceState::new(
            ActorRef::new("Counter", "a"),
            None,
            RestartBackoff::new(3, StdDuration::from_secs(10)),
        );
        assert_eq!(state.activation_state, ActivationState::Activating);
        assert!(state.children.is_empty());
        assert!(state.parent.is_none());
    }

    #[test]
    fn touch_advances_last_activity() {
        let mut state = ActorInstanceState::new(
            ActorRef::new("Counter", "a"),
            None,
            RestartBackoff::new(3, StdDuration::from_secs(10)),
        );
        let first = state.last_activity;
        std::thread::sleep(StdDuration::from_millis(5));
        state.touch();
        assert!(state.last_activity >= first);
    }
}
