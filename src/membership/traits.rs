// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tokio::sync::broadcast;

// Layer 3: Internal module imports
use super::error::MembershipError;
use super::types::{MembershipChange, SiloInfo};
use crate::util::ids::SiloId;

/// External contract for a cluster membership directory (§4.3).
///
/// The in-crate reference implementation is
/// [`super::in_memory::InMemoryMembershipTable`]; production deployments
/// supply their own (etcd, a gossip protocol, a cloud provider's
/// instance registry, ...).
#[async_trait]
pub trait MembershipTable: Send + Sync {
    async fn register(&self, info: SiloInfo) -> Result<(), MembershipError>;

    async fn heartbeat(&self, silo_id: &SiloId) -> Result<(), MembershipError>;

    async fn list(&self) -> Vec<SiloInfo>;

    async fn evict(&self, silo_id: &SiloId) -> Result<(), MembershipError>;

    async fn set_status(
        &self,
        silo_id: &SiloId,
        status: super::types::SiloStatus,
    ) -> Result<(), MembershipError>;

    /// Subscribes to membership change notifications.
    fn subscribe(&self) -> broadcast::Receiver<MembershipChange>;

    /// Casts `voter`'s own vote that `silo_id` looks dead and returns the
    /// number of distinct silos that have voted within `window` (§4.3
    /// majority-quorum eviction). A table with no real cross-silo
    /// coordination can only approximate this as a lone voter; a table
    /// backed by genuine gossip or a shared directory should tally every
    /// distinct peer's vote and override this default.
    async fn record_suspicion(&self, _silo_id: &SiloId, _voter: &SiloId, _window: Duration) -> usize {
        1
    }

    /// Clears any outstanding suspicion votes for `silo_id` — it
    /// heartbeated again, or was just evicted and the tally is moot.
    async fn clear_suspicion(&self, _silo_id: &SiloId) {}
}
