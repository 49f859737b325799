//! Top-level error surface, aggregating every component's error type (§7).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::activation::ActivationError;
use crate::chain::ChainError;
use crate::codec::CodecError;
use crate::mailbox::MailboxError;
use crate::membership::MembershipError;
use crate::reminder::ReminderError;
use crate::ring::RingError;
use crate::transport::TransportError;

/// Everything a caller of [`super::SiloCoordinator`] can observe (§7
/// "Error taxonomy"). Each infrastructure variant carries enough
/// context to decide whether a retry is worthwhile; `HandlerException`
/// is the one variant that is also raised to the failing actor's
/// supervisor, never just returned here.
#[derive(Debug, Error)]
pub enum SiloError {
    #[error("no factory registered for actor type {actor_type}")]
    UnknownActorType { actor_type: String },

    #[error("method not found: {actor_type}/{method_name}")]
    MethodNotFound {
        actor_type: String,
        method_name: String,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("on_activate failed for {actor_type}/{actor_id}: {reason}")]
    ActivationFailed {
        actor_type: String,
        actor_id: String,
        reason: String,
    },

    #[error(transparent)]
    Mailbox(#[from] MailboxError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("request timed out")]
    Timeout,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("this silo is shutting down and is not accepting new work")]
    SiloShuttingDown,

    #[error("version conflict on save (expected {expected}, found {found})")]
    ConcurrencyError { expected: u64, found: u64 },

    #[error("handler exception: {0}")]
    HandlerException(String),

    #[error(transparent)]
    Ring(#[from] RingError),

    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    Reminder(#[from] ReminderError),
}

impl From<ActivationError> for SiloError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::UnknownActorType { actor_type } => SiloError::UnknownActorType { actor_type },
            ActivationError::MethodNotFound { actor_type, method_name } => {
                SiloError::MethodNotFound { actor_type, method_name }
            }
            ActivationError::ActivationFailed { actor_type, actor_id, reason } => {
                SiloError::ActivationFailed { actor_type, actor_id, reason }
            }
            ActivationError::HandlerException(reason) => SiloError::HandlerException(reason),
            ActivationError::Codec(e) => SiloError::Codec(e),
            ActivationError::Mailbox(e) => SiloError::Mailbox(e),
            ActivationError::Chain(e) => SiloError::Chain(e),
        }
    }
}

impl SiloError {
    /// Infrastructure errors (protocol problems) are never raised to a
    /// supervisor; only `HandlerException` represents a genuine actor
    /// failure (§7 "Propagation policy").
    pub fn is_handler_exception(&self) -> bool {
        matches!(self, SiloError::HandlerException(_))
    }

    /// Caller-visible errors worth retrying without any topology change
    /// (a stream hiccup, a transient mailbox backlog) versus ones a
    /// retry must route around (`SiloShuttingDown`, a stale ring view).
    pub fn is_transient(&self) -> bool {
        match self {
            SiloError::Mailbox(e) => e.is_transient(),
            SiloError::Transport(e) => e.is_transient(),
            SiloError::Membership(e) => e.is_transient(),
            SiloError::Reminder(e) => e.is_transient(),
            SiloError::Timeout | SiloError::SiloShuttingDown => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_exception_is_the_only_supervisor_raising_variant() {
        assert!(SiloError::HandlerException("boom".into()).is_handler_exception());
        assert!(!SiloError::UnknownActorType { actor_type: "X".into() }.is_handler_exception());
    }

    #[test]
    fn shutting_down_and_timeout_are_retriable() {
        assert!(SiloError::SiloShuttingDown.is_transient());
        assert!(SiloError::Timeout.is_transient());
        assert!(!SiloError::ConcurrencyError { expected: 1, found: 2 }.is_transient());
    }
}
