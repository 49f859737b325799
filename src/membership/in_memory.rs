// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::broadcast;

// Layer 3: Internal module imports
use super::error::MembershipError;
use super::traits::MembershipTable;
use super::types::{MembershipChange, SiloInfo, SiloStatus};
use crate::util::ids::SiloId;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// In-process reference implementation of [`MembershipTable`], backed by
/// a `DashMap`. Suitable for tests and single-process "clusters"; a real
/// deployment swaps this for an implementation backed by a coordination
/// service.
///
/// Every [`super::service::MembershipService`] in the "cluster" shares
/// the same table instance (cloned `Arc`), so suspicion votes cast by
/// distinct `self_id`s through [`MembershipTable::record_suspicion`] are
/// genuinely distinct peer votes, not one process counting itself twice.
#[derive(Clone)]
pub struct InMemoryMembershipTable {
    rows: Arc<DashMap<SiloId, SiloInfo>>,
    changes: broadcast::Sender<MembershipChange>,
    suspicions: Arc<DashMap<SiloId, DashMap<SiloId, DateTime<Utc>>>>,
}

impl InMemoryMembershipTable {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            rows: Arc::new(DashMap::new()),
            changes,
            suspicions: Arc::new(DashMap::new()),
        }
    }

    fn notify(&self, change: MembershipChange) {
        // No active subscribers is not an error: membership still updates.
        let _ = self.changes.send(change);
    }
}

impl Default for InMemoryMembershipTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipTable for InMemoryMembershipTable {
    async fn register(&self, info: SiloInfo) -> Result<(), MembershipError> {
        if self.rows.contains_key(&info.silo_id) {
            return Err(MembershipError::AlreadyRegistered(info.silo_id));
        }
        let silo_id = info.silo_id.clone();
        self.rows.insert(silo_id, info.clone());
        self.notify(MembershipChange::Registered(info));
        Ok(())
    }

    async fn heartbeat(&self, silo_id: &SiloId) -> Result<(), MembershipError> {
        let mut row = self
            .rows
            .get_mut(silo_id)
            .ok_or_else(|| MembershipError::UnknownSilo(silo_id.clone()))?;
        row.last_heartbeat = Utc::now();
        drop(row);
        self.clear_suspicion(silo_id).await;
        self.notify(MembershipChange::HeartbeatReceived {
            silo_id: silo_id.clone(),
        });
        Ok(())
    }

    async fn list(&self) -> Vec<SiloInfo> {
        self.rows.iter().map(|e| e.value().clone()).collect()
    }

    async fn evict(&self, silo_id: &SiloId) -> Result<(), MembershipError> {
        let mut row = self
            .rows
            .get_mut(silo_id)
            .ok_or_else(|| MembershipError::UnknownSilo(silo_id.clone()))?;
        // Idempotent: evicting an already-Dead silo is a no-op success.
        if row.status == SiloStatus::Dead {
            return Ok(());
        }
        row.status = SiloStatus::Dead;
        drop(row);
        self.clear_suspicion(silo_id).await;
        self.notify(MembershipChange::Evicted {
            silo_id: silo_id.clone(),
        });
        Ok(())
    }

    async fn set_status(&self, silo_id: &SiloId, status: SiloStatus) -> Result<(), MembershipError> {
        let mut row = self
            .rows
            .get_mut(silo_id)
            .ok_or_else(|| MembershipError::UnknownSilo(silo_id.clone()))?;
        row.status = status;
        drop(row);
        self.notify(MembershipChange::StatusChanged {
            silo_id: silo_id.clone(),
            status,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<MembershipChange> {
        self.changes.subscribe()
    }

    async fn record_suspicion(&self, silo_id: &SiloId, voter: &SiloId, window: Duration) -> usize {
        let now = Utc::now();
        let window = chrono::Duration::from_std(window).unwrap_or_default();
        let votes = self.suspicions.entry(silo_id.clone()).or_default();
        votes.retain(|_, cast_at| now.signed_duration_since(*cast_at) <= window);
        votes.insert(voter.clone(), now);
        votes.len()
    }

    async fn clear_suspicion(&self, silo_id: &SiloId) {
        self.suspicions.remove(silo_id);
    }
}
