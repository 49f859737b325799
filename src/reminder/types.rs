//! Durable scheduled-wake-up data model (§3 "Reminder", §4.10).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use bytes::Bytes;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Row identity: a reminder table implementation is free to use any
/// opaque id internally, but `(owner_actor_type, owner_actor_id, name)`
/// remains the logical primary key callers address by (§3, §6 item 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReminderId(Uuid);

impl ReminderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReminderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReminderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A durable scheduled invocation of an actor's `on_reminder` hook,
/// owned by whichever silo currently holds `(owner_actor_type,
/// owner_actor_id)` in the hash ring (§4.10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub owner_actor_type: String,
    pub owner_actor_id: String,
    pub name: String,
    pub due_at: DateTime<Utc>,
    /// `Some` for a periodic reminder (rearmed by `due_at += period` on
    /// success); `None` for a one-shot reminder (deleted on success).
    pub period: Option<std::time::Duration>,
    pub payload: Bytes,
    /// `Some` while a silo has claimed this row for firing (§6 item 3,
    /// `claim` is conditional); cleared on success or on firing failure.
    pub claimed_by: Option<String>,
}

impl Reminder {
    pub fn new(
        owner_actor_type: impl Into<String>,
        owner_actor_id: impl Into<String>,
        name: impl Into<String>,
        due_at: DateTime<Utc>,
        period: Option<std::time::Duration>,
        payload: Bytes,
    ) -> Self {
        Self {
            id: ReminderId::new(),
            owner_actor_type: owner_actor_type.into(),
            owner_actor_id: owner_actor_id.into(),
            name: name.into(),
            due_at,
            period,
            payload,
            claimed_by: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }

    /// Advances `due_at` by `period` for a periodic reminder.
    pub fn rearm(&mut self) {
        if let Some(period) = self.period {
            self.due_at += ChronoDuration::from_std(period).unwrap_or_else(|_| ChronoDuration::zero());
        }
    }
}
