// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Identity of a virtual actor: `(actor_type, actor_id)`.
///
/// `actor_type` is the routing-key namespace (a fully-qualified interface
/// name, or an explicit override); `actor_id` is user-chosen and stable
/// across the actor's virtual lifetime. Both are plain strings — there is
/// no UUID generation here, since the caller picks the identity.
///
/// # Example
/// ```rust
/// use quark::util::ActorRef;
///
/// let a = ActorRef::new("Counter", "shard-7");
/// let b = ActorRef::new("Counter", "shard-7");
/// assert_eq!(a, b); // same (type, id) pair, same identity
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorRef {
    pub actor_type: String,
    pub actor_id: String,
}

impl ActorRef {
    pub fn new(actor_type: impl Into<String>, actor_id: impl Into<String>) -> Self {
        Self {
            actor_type: actor_type.into(),
            actor_id: actor_id.into(),
        }
    }

    pub fn actor_type(&self) -> &str {
        &self.actor_type
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    /// 64-bit placement key, `hash(actor_type, actor_id)`, used by the hash ring.
    pub fn placement_key(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.actor_type.hash(&mut hasher);
        self.actor_id.hash(&mut hasher);
        hasher.finish()
    }
}

impl Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.actor_type, self.actor_id)
    }
}

/// Identifier of a silo (process). `(silo_id, generation)` uniquely
/// identifies a silo incarnation; `SiloId` alone identifies the logical
/// silo across restarts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiloId(pub String);

impl SiloId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SiloId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a request envelope; doubles as the correlation
/// id copied onto its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier scoping one logical request tree across reentrant calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(Uuid);

impl ChainId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_ref_equality_by_type_and_id() {
        let a = ActorRef::new("Counter", "x");
        let b = ActorRef::new("Counter", "x");
        let c = ActorRef::new("Counter", "y");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn actor_ref_placement_key_stable() {
        let a = ActorRef::new("Counter", "x");
        assert_eq!(a.placement_key(), a.placement_key());
        let b = ActorRef::new("Counter", "y");
        assert_ne!(a.placement_key(), b.placement_key());
    }

    #[test]
    fn actor_ref_display() {
        let a = ActorRef::new("Counter", "x");
        assert_eq!(format!("{a}"), "Counter/x");
    }

    #[test]
    fn message_id_unique() {
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn chain_id_unique() {
        assert_ne!(ChainId::new(), ChainId::new());
    }

    #[test]
    fn silo_id_display() {
        let s = SiloId::new("silo-1");
        assert_eq!(format!("{s}"), "silo-1");
    }
}
