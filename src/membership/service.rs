// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use tracing::{info, warn};

// Layer 3: Internal module imports
use super::error::MembershipError;
use super::traits::MembershipTable;
use super::types::{SiloInfo, SiloStatus};
use crate::ring::{HashRing, RingHandle};
use crate::util::ids::SiloId;

/// Tunables for [`MembershipService`], drawn from the silo configuration
/// surface (`heartbeat_interval`, `failure_threshold`,
/// `self_expel_threshold`, `virtual_nodes_per_silo`).
#[derive(Debug, Clone)]
pub struct MembershipConfig {
    pub heartbeat_interval: Duration,
    pub failure_threshold: Duration,
    pub self_expel_threshold: Duration,
    pub virtual_nodes_per_silo: u32,
}

impl Default for MembershipConfig {
    fn default() -> Self {
        let heartbeat_interval = Duration::from_secs(5);
        Self {
            heartbeat_interval,
            failure_threshold: heartbeat_interval * 3,
            self_expel_threshold: heartbeat_interval * 6,
            virtual_nodes_per_silo: crate::ring::DEFAULT_VIRTUAL_NODES_PER_SILO,
        }
    }
}

/// Drives cluster membership for one silo: joins the table, heartbeats,
/// watches for changes to rebuild and republish the hash ring, detects
/// and evicts failed peers under a quorum rule, and self-expels when it
/// loses contact with the table (§4.3).
pub struct MembershipService<T: MembershipTable> {
    table: Arc<T>,
    ring: RingHandle,
    self_id: SiloId,
    config: MembershipConfig,
    self_expelled: AtomicBool,
}

impl<T: MembershipTable + 'static> MembershipService<T> {
    pub fn new(table: Arc<T>, self_id: SiloId, config: MembershipConfig) -> Self {
        Self {
            table,
            ring: RingHandle::new(HashRing::empty(config.virtual_nodes_per_silo)),
            self_id,
            config,
            self_expelled: AtomicBool::new(false),
        }
    }

    pub fn ring(&self) -> RingHandle {
        self.ring.clone()
    }

    /// Registers this silo as `Joining` then promotes it to `Active`,
    /// and rebuilds the ring from the table's current view.
    pub async fn join(&self, endpoint: impl Into<String>, generation: u64) -> Result<(), MembershipError> {
        self.table
            .register(SiloInfo::joining(self.self_id.clone(), endpoint, generation))
            .await?;
        self.table
            .set_status(&self.self_id, SiloStatus::Active)
            .await?;
        self.rebuild_ring().await;
        Ok(())
    }

    /// Rebuilds the ring from every currently-`Active` silo and
    /// republishes it atomically.
    pub async fn rebuild_ring(&self) {
        let mut ring = HashRing::empty(self.config.virtual_nodes_per_silo);
        for silo in self.table.list().await {
            if silo.is_active() {
                ring = ring.add_silo(&silo.silo_id);
            }
        }
        self.ring.publish(ring);
    }

    /// Runs the heartbeat loop until cancelled. Intended to be spawned
    /// as a long-lived task by the silo coordinator.
    pub async fn run_heartbeat_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.heartbeat_interval);
        loop {
            interval.tick().await;
            match self.table.heartbeat(&self.self_id).await {
                Ok(()) => self.self_expelled.store(false, Ordering::SeqCst),
                Err(err) => {
                    warn!(error = %err, "heartbeat failed");
                    self.maybe_self_expel().await;
                }
            }
        }
    }

    /// Runs the change-subscription loop: on every membership change,
    /// rebuilds and republishes the ring.
    pub async fn run_watch_loop(self: Arc<Self>) {
        let mut rx = self.table.subscribe();
        loop {
            match rx.recv().await {
                Ok(change) => {
                    info!(?change, "membership change observed");
                    self.rebuild_ring().await;
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "membership watch lagged, rebuilding from full list");
                    self.rebuild_ring().await;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Runs the failure-detection loop: evicts any `Active` silo whose
    /// last heartbeat is older than `failure_threshold`, subject to a
    /// majority-of-`Active` quorum evaluated against the table snapshot
    /// taken at the start of the round.
    pub async fn run_failure_detector_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.heartbeat_interval);
        loop {
            interval.tick().await;
            self.run_failure_detection_round().await;
        }
    }

    async fn run_failure_detection_round(&self) {
        let snapshot = self.table.list().await;
        let active_count = snapshot.iter().filter(|s| s.is_active()).count();
        let required = active_count / 2 + 1;
        let now = chrono::Utc::now();

        for silo in &snapshot {
            if silo.is_active() && silo.heartbeat_age(now) > chrono::Duration::from_std(self.config.failure_threshold).unwrap_or_default() {
                let votes = self
                    .table
                    .record_suspicion(&silo.silo_id, &self.self_id, self.config.failure_threshold)
                    .await;
                if votes >= required || active_count <= 1 {
                    match self.table.evict(&silo.silo_id).await {
                        Ok(()) => {
                            info!(silo_id = %silo.silo_id, "evicted unresponsive silo");
                            self.rebuild_ring().await;
                        }
                        Err(err) => warn!(error = %err, silo_id = %silo.silo_id, "eviction failed"),
                    }
                } else {
                    warn!(
                        silo_id = %silo.silo_id,
                        votes,
                        required,
                        "eviction did not reach quorum this round"
                    );
                }
            }
        }
    }

    async fn maybe_self_expel(&self) {
        // A single failed heartbeat does not self-expel; only sustained
        // loss of contact for self_expel_threshold does. Since this
        // reference implementation's table call either succeeds or
        // fails immediately, we approximate "sustained" with the next
        // heartbeat tick also failing, tracked by self_expelled.
        if self.self_expelled.swap(true, Ordering::SeqCst) {
            warn!(silo_id = %self.self_id, "self-expelling: lost contact with membership table");
            let _ = self
                .table
                .set_status(&self.self_id, SiloStatus::ShuttingDown)
                .await;
        }
    }
}
