//! Per-turn actor context (§4.6, §5, §9 ambient request context).

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
use crate::util::ActorRef;

/// Capability an `ActorContext` borrows to make outbound calls to other
/// actors (possibly on other silos). Actors never hold direct
/// references to other actors — every cross-actor call is routed
/// through this trait, which is implemented by the activation
/// dispatcher and threads the ambient call-chain context (§4.8)
/// through the outbound envelope. The narrow exception is a parent's
/// direct handle to a supervised child (§4.9), which does not go
/// through this path.
#[async_trait]
pub trait OutboundCaller: Send + Sync {
    async fn call(
        &self,
        actor_type: &str,
        actor_id: &str,
        method_name: &str,
        payload: Bytes,
    ) -> Result<Bytes, crate::silo::SiloError>;
}

/// A no-op caller for actors that never call out (and for unit tests).
pub struct NullOutboundCaller;

#[async_trait]
impl OutboundCaller for NullOutboundCaller {
    async fn call(
        &self,
        actor_type: &str,
        actor_id: &str,
        method_name: &str,
        _payload: Bytes,
    ) -> Result<Bytes, crate::silo::SiloError> {
        Err(crate::silo::SiloError::UnknownActorType {
            actor_type: format!("{actor_type}/{actor_id}#{method_name}"),
        })
    }
}

/// Per-invocation context handed to `Actor::dispatch` and the
/// lifecycle hooks. Carries this instance's identity and an outbound
/// call handle; the call-chain itself lives in task-local storage
/// (`crate::chain`), not here, since it must survive across `.await`
/// points without being explicitly threaded by handler code.
pub struct ActorContext {
    actor_ref: ActorRef,
    activated_at: DateTime<Utc>,
    caller: Arc<dyn OutboundCaller>,
}

impl ActorContext {
    pub fn new(actor_ref: ActorRef, caller: Arc<dyn OutboundCaller>) -> Self {
        Self {
            actor_ref,
            activated_at: Utc::now(), // §3.2
            caller,
        }
    }

    pub fn actor_ref(&self) -> &ActorRef {
        &self.actor_ref
    }

    pub fn activated_at(&self) -> DateTime<Utc> {
        self.activated_at
    }

    /// Calls another actor's method. The ambient call chain (if any) is
    /// propagated by the underlying `OutboundCaller` implementation.
    pub async fn call(
        &self,
        actor_type: &str,
        actor_id: &str,
        method_name: &str,
        payload: Bytes,
    ) -> Result<Bytes, crate::silo::SiloError> {
        self.caller.call(actor_type, actor_id, method_name, payload).await
    }
}
