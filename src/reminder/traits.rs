// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};

// Layer 3: Internal module imports
use super::error::ReminderError;
use super::types::{Reminder, ReminderId};

/// External contract for durable reminder storage (§6 item 3). The
/// in-crate reference implementation is
/// [`super::in_memory::InMemoryReminderTable`]; a production deployment
/// supplies one backed by a real table so reminders survive restarts.
#[async_trait]
pub trait ReminderTable: Send + Sync {
    /// Inserts a reminder, or updates it in place if
    /// `(owner_actor_type, owner_actor_id, name)` already exists.
    async fn upsert(&self, reminder: Reminder) -> Result<ReminderId, ReminderError>;

    /// Lists every row whose `due_at <= now`, regardless of claim state
    /// — the scheduler still has to test ring ownership and attempt the
    /// claim itself.
    async fn list_due(&self, now: DateTime<Utc>) -> Vec<Reminder>;

    /// Conditionally claims a due row for `by_silo`; `Ok(true)` iff this
    /// call won the claim (i.e. the row was unclaimed or already claimed
    /// by `by_silo`). Two silos racing on the same row cannot both claim
    /// it — required for §4.10's "claimed before firing" rule.
    async fn claim(&self, id: ReminderId, now: DateTime<Utc>, by_silo: &str) -> Result<bool, ReminderError>;

    /// Deletes a one-shot reminder after a successful callback.
    async fn delete(&self, id: ReminderId) -> Result<(), ReminderError>;

    /// Rearms a periodic reminder to `new_due` and releases its claim.
    async fn update_next(&self, id: ReminderId, new_due: DateTime<Utc>) -> Result<(), ReminderError>;

    /// Releases a claim without rearming or deleting — used when a
    /// callback failed and the row should become claimable again on the
    /// next tick (§4.10 "failures ... at-least-once, a crash ... will
    /// refire").
    async fn release_claim(&self, id: ReminderId) -> Result<(), ReminderError>;
}
