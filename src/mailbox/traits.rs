//! Core mailbox traits and supporting types for actor instance queuing.
//!
//! - `MailboxReceiver`: owned exclusively by one actor instance's
//!   dispatcher turn-loop.
//! - `MailboxSender`: cheaply cloneable, shared by every caller posting
//!   to this actor.
//! - `MailboxCapacity`, `MailboxError`, `TryRecvError`: configuration
//!   and error surface.
//!
//! Unlike the teacher's generic-over-`Message` mailbox, this mailbox is
//! concrete over [`crate::message::Envelope`]: every actor instance's
//! queue carries the same wire type, and per-method typing happens only
//! inside the per-method codec (§4.1), not at the mailbox boundary.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
use crate::message::Envelope;

/// Mailbox receiver: the consumer side owned by one actor instance's
/// dispatcher loop (§4.5).
#[async_trait]
pub trait MailboxReceiver: Send + Sync {
    /// Receives the next envelope. Returns `None` once the mailbox is
    /// closed and drained.
    async fn recv(&mut self) -> Option<Envelope>;

    /// Non-blocking receive.
    fn try_recv(&mut self) -> Result<Envelope, TryRecvError>;

    fn capacity(&self) -> MailboxCapacity;

    /// Approximate current depth (observable to collectors per §4.5).
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mailbox sender: cheaply cloneable producer side.
#[async_trait]
pub trait MailboxSender: Send + Sync + Clone {
    /// Posts an envelope. Applies the configured [`super::BackpressureStrategy`]
    /// when full; `Ok(true)` means enqueued, `Ok(false)` means dropped by
    /// a `DropOldest`/`DropNewest` policy.
    async fn send(&self, envelope: Envelope) -> Result<bool, MailboxError>;

    /// Non-blocking post; fails immediately if full rather than applying
    /// backpressure.
    fn try_send(&self, envelope: Envelope) -> Result<(), MailboxError>;
}

/// Mailbox capacity configuration. Default per §6 configuration surface
/// is `Bounded(1000)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxCapacity {
    Bounded(usize),
    Unbounded,
}

/// Mailbox error types.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("mailbox is full (capacity: {capacity})")]
    Full { capacity: usize },

    #[error("mailbox is closed")]
    Closed,

    #[error("backpressure applied: {strategy:?}")]
    BackpressureApplied {
        strategy: crate::mailbox::BackpressureStrategy,
    },

    #[error("TTL expired for message at {timestamp}")]
    TtlExpired { timestamp: DateTime<Utc> },
}

impl MailboxError {
    /// `Full` and backpressure rejections are transient (caller may
    /// retry once the consumer drains); `Closed` is terminal.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MailboxError::Full { .. } | MailboxError::BackpressureApplied { .. }
        )
    }
}

/// Non-blocking receive error types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TryRecvError {
    #[error("mailbox is empty")]
    Empty,

    #[error("mailbox is closed")]
    Closed,
}
