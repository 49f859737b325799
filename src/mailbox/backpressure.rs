//! Backpressure strategies for full bounded mailboxes (§4.5, §6 config surface).

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Overflow policy applied when a bounded mailbox is at capacity.
/// Selectable per actor type via the silo configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackpressureStrategy {
    /// Producer awaits until space is available. Default.
    #[default]
    Block,

    /// Evicts the oldest queued envelope to make room for the new one.
    DropOldest,

    /// Silently declines the new envelope, keeping the queue as-is.
    DropNewest,

    /// Fails immediately with `MailboxError::Full`.
    Reject,
}

impl fmt::Display for BackpressureStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "Block"),
            Self::DropOldest => write!(f, "DropOldest"),
            Self::DropNewest => write!(f, "DropNewest"),
            Self::Reject => write!(f, "Reject"),
        }
    }
}
