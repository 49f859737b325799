// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use super::types::ReminderId;

/// Errors raised by the reminder table and its scheduler (§4.10, §6 item 3).
#[derive(Debug, Error)]
pub enum ReminderError {
    #[error("reminder {0} not found")]
    NotFound(ReminderId),

    #[error("reminder {owner_actor_type}/{owner_actor_id}#{name} already exists")]
    AlreadyExists {
        owner_actor_type: String,
        owner_actor_id: String,
        name: String,
    },

    #[error("reminder {0} was claimed by another silo before this claim")]
    ClaimLost(ReminderId),

    #[error("callback for reminder {id} failed: {reason}")]
    CallbackFailed { id: ReminderId, reason: String },
}

impl ReminderError {
    /// `ClaimLost` is an expected race under concurrent scanning, not a
    /// fatal condition; everything else reflects a genuine problem.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReminderError::ClaimLost(_))
    }
}
