//! Errors raised by activation and dispatch (§4.6, §7).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::chain::ChainError;
use crate::codec::CodecError;
use crate::mailbox::MailboxError;

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("no factory registered for actor type {actor_type}")]
    UnknownActorType { actor_type: String },

    #[error("method not found: {actor_type}/{method_name}")]
    MethodNotFound {
        actor_type: String,
        method_name: String,
    },

    #[error("on_activate failed for {actor_type}/{actor_id}: {reason}")]
    ActivationFailed {
        actor_type: String,
        actor_id: String,
        reason: String,
    },

    #[error("handler exception: {0}")]
    HandlerException(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Mailbox(#[from] MailboxError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

impl ActivationError {
    /// `UnknownActorType`, `MethodNotFound`, `Codec` reflect a protocol
    /// problem and are never raised to the supervisor (§7); only
    /// `HandlerException` is.
    pub fn is_handler_exception(&self) -> bool {
        matches!(self, ActivationError::HandlerException(_))
    }
}
