//! Core `Actor` capability (§4.1, §4.6, §9).
//!
//! The source models actors as a base-class hierarchy with runtime type
//! lookup; here an actor is any type implementing trait/interface
//! composition: the `Actor` capability (lifecycle hooks plus dispatch)
//! is the only thing the dispatcher requires. There is no inheritance
//! hierarchy and no reflection — actor types are registered in a
//! compile-time-populated factory table (`crate::activation`).

// Layer 1: Standard library imports
use std::error::Error as StdError;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use bytes::Bytes;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::codec::CodecError;

/// An addressable, single-threaded entity keyed by `(actor_type, actor_id)`.
///
/// `dispatch` is the single entry point the activation dispatcher calls
/// for every popped envelope (§4.6): it is handed the decoded method
/// name and the raw request payload, and returns the raw response
/// payload. Per-method argument typing is the implementor's concern —
/// generated actor implementations match on `method_name` and decode
/// with the matching codec (§4.1) — the dispatcher itself never
/// inspects payload bytes.
#[async_trait]
pub trait Actor: Send + Sync + 'static {
    /// Error type surfaced by handler logic. Escapes `dispatch` as
    /// `ActorError::Handler` and is both turned into an error response
    /// for the caller and raised to the supervisor (§7 propagation
    /// policy).
    type Error: StdError + Send + Sync + 'static;

    /// Invokes `method_name` with `payload`, returning the encoded
    /// response payload. A `method_name` unknown to this actor returns
    /// `ActorError::MethodNotFound`, never a panic.
    async fn dispatch(
        &mut self,
        method_name: &str,
        payload: Bytes,
        ctx: &mut ActorContext,
    ) -> Result<Bytes, ActorError<Self::Error>>;

    /// Called once, after the instance is constructed and its mailbox
    /// started, before the triggering envelope is delivered (§4.6).
    /// Hook failure leaves no instance behind.
    async fn on_activate(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called once during deactivation, after in-flight messages have
    /// drained and before the mailbox is closed.
    async fn on_deactivate(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Invoked by the reminder scheduler (§4.10) when a due reminder
    /// this actor owns fires. Default implementation ignores reminders
    /// the actor hasn't opted into handling.
    async fn on_reminder(
        &mut self,
        _name: &str,
        _payload: Bytes,
        _ctx: &mut ActorContext,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Supervision decision following a `HandlerException` (§4.9).
    /// Default is conservative: stop the instance.
    async fn on_error(&mut self, _error: &Self::Error, _ctx: &mut ActorContext) -> ErrorAction {
        ErrorAction::Stop
    }
}

/// Errors `Actor::dispatch` can surface. `MethodNotFound` and `Codec`
/// are protocol problems — never raised to the supervisor (§7);
/// `Handler` is user-code failure — raised to the supervisor in
/// addition to becoming an error response.
#[derive(Debug, thiserror::Error)]
pub enum ActorError<E> {
    #[error("method not found: {method_name}")]
    MethodNotFound { method_name: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("handler exception: {0}")]
    Handler(E),
}

/// Supervision decision returned by `Actor::on_error` (§4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorAction {
    /// Deactivate the instance permanently.
    #[default]
    Stop,
    /// Keep the instance alive without running the restart recipe.
    Resume,
    /// Re-create the instance from its factory with fresh state.
    Restart,
    /// Treat as the parent's own failure.
    Escalate,
}
