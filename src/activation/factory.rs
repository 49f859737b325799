//! Static, compile-time-populated actor type registry (§9).
//!
//! Replaces the source's runtime type lookup by name with a table
//! written once at process start: `actor_type → factory`. No
//! reflection, no scanning.

// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::dyn_actor::DynActor;
use super::error::ActivationError;

/// Constructs a fresh instance of one actor type. Implementors are
/// typically a zero-sized marker type per actor type, registered once
/// with [`ActorTypeRegistry::register`].
pub trait ActorFactory: Send + Sync {
    fn actor_type(&self) -> &str;

    fn create(&self, actor_id: &str) -> Box<dyn DynActor>;
}

/// `actor_type → factory` table. Presence-only: the dispatcher consults
/// this before ever constructing an instance.
#[derive(Clone, Default)]
pub struct ActorTypeRegistry {
    factories: Arc<DashMap<String, Arc<dyn ActorFactory>>>,
}

impl ActorTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, factory: Arc<dyn ActorFactory>) {
        self.factories.insert(factory.actor_type().to_string(), factory);
    }

    pub fn create(&self, actor_type: &str, actor_id: &str) -> Result<Box<dyn DynActor>, ActivationError> {
        self.factories
            .get(actor_type)
            .map(|f| f.create(actor_id))
            .ok_or_else(|| ActivationError::UnknownActorType {
                actor_type: actor_type.to_string(),
            })
    }

    pub fn is_registered(&self, actor_type: &str) -> bool {
        self.factories.contains_key(actor_type)
    }
}
