//! Object-safe erasure of [`crate::actor::Actor`] (§9 "runtime type lookup
//! by string name" → static factory table, no reflection).
//!
//! `Actor` carries an associated `Error` type, so it cannot be boxed as
//! `dyn Actor` directly. `DynActor` is the object-safe shadow trait the
//! activation registry actually stores; a blanket impl wraps every
//! `Actor` into one, boxing its error behind `DynActorError`.

// Layer 1: Standard library imports
use std::error::Error as StdError;
use std::fmt;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use bytes::Bytes;

// Layer 3: Internal module imports
use crate::actor::{Actor, ActorContext, ActorError, ErrorAction};

/// Type-erased handler error. Preserves the original `Display` output;
/// also keeps the concrete error boxed as `Any` so the blanket
/// `DynActor` impl below can recover it and forward to the actor's own
/// `Actor::on_error` — the dispatcher only ever sees the erased type,
/// but the supervision decision still has to come from the concrete
/// actor, not a one-size-fits-all default.
pub struct DynActorError {
    display: String,
    any: Box<dyn std::any::Any + Send + Sync>,
}

impl DynActorError {
    fn new<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self {
            display: error.to_string(),
            any: Box::new(error),
        }
    }

    fn downcast_ref<E: StdError + Send + Sync + 'static>(&self) -> Option<&E> {
        self.any.downcast_ref::<E>()
    }
}

impl fmt::Debug for DynActorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynActorError").field("display", &self.display).finish()
    }
}

impl fmt::Display for DynActorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}

impl StdError for DynActorError {}

/// Errors a boxed actor's `dispatch` can surface — the erased
/// counterpart of `ActorError<E>`.
#[derive(Debug, thiserror::Error)]
pub enum DynDispatchError {
    #[error("method not found: {method_name}")]
    MethodNotFound { method_name: String },

    #[error(transparent)]
    Codec(#[from] crate::codec::CodecError),

    #[error("handler exception: {0}")]
    Handler(DynActorError),
}

impl<E: StdError + Send + Sync + 'static> From<ActorError<E>> for DynDispatchError {
    fn from(err: ActorError<E>) -> Self {
        match err {
            ActorError::MethodNotFound { method_name } => {
                DynDispatchError::MethodNotFound { method_name }
            }
            ActorError::Codec(e) => DynDispatchError::Codec(e),
            ActorError::Handler(e) => DynDispatchError::Handler(DynActorError::new(e)),
        }
    }
}

#[async_trait]
pub trait DynActor: Send {
    async fn dispatch(
        &mut self,
        method_name: &str,
        payload: Bytes,
        ctx: &mut ActorContext,
    ) -> Result<Bytes, DynDispatchError>;

    async fn on_activate(&mut self, ctx: &mut ActorContext) -> Result<(), DynActorError>;
    async fn on_deactivate(&mut self, ctx: &mut ActorContext) -> Result<(), DynActorError>;
    async fn on_reminder(
        &mut self,
        name: &str,
        payload: Bytes,
        ctx: &mut ActorContext,
    ) -> Result<(), DynActorError>;
    async fn on_error(&mut self, error: &DynActorError, ctx: &mut ActorContext) -> ErrorAction;
}

#[async_trait]
impl<A: Actor> DynActor for A {
    async fn dispatch(
        &mut self,
        method_name: &str,
        payload: Bytes,
        ctx: &mut ActorContext,
    ) -> Result<Bytes, DynDispatchError> {
        Actor::dispatch(self, method_name, payload, ctx)
            .await
            .map_err(Into::into)
    }

    async fn on_activate(&mut self, ctx: &mut ActorContext) -> Result<(), DynActorError> {
        Actor::on_activate(self, ctx).await.map_err(DynActorError::new)
    }

    async fn on_deactivate(&mut self, ctx: &mut ActorContext) -> Result<(), DynActorError> {
        Actor::on_deactivate(self, ctx).await.map_err(DynActorError::new)
    }

    async fn on_reminder(
        &mut self,
        name: &str,
        payload: Bytes,
        ctx: &mut ActorContext,
    ) -> Result<(), DynActorError> {
        Actor::on_reminder(self, name, payload, ctx)
            .await
            .map_err(DynActorError::new)
    }

    async fn on_error(&mut self, error: &DynActorError, ctx: &mut ActorContext) -> ErrorAction {
        match error.downcast_ref::<A::Error>() {
            Some(typed) => Actor::on_error(self, typed, ctx).await,
            // Only reachable if a `DynActorError` is ever routed to an
            // actor instance other than the one that produced it, which
            // the dispatcher never does.
            None => ErrorAction::Stop,
        }
    }
}
