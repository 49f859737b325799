// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::ids::SiloId;

/// A silo's lifecycle status within the membership table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiloStatus {
    Joining,
    Active,
    ShuttingDown,
    Dead,
}

/// One row of the membership table: `(silo_id, endpoint, generation, status)`.
///
/// `generation` increases monotonically on restart; `(silo_id, generation)`
/// uniquely identifies a silo incarnation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiloInfo {
    pub silo_id: SiloId,
    pub endpoint: String,
    pub generation: u64,
    pub status: SiloStatus,
    pub last_heartbeat: DateTime<Utc>,
}

impl SiloInfo {
    pub fn joining(silo_id: SiloId, endpoint: impl Into<String>, generation: u64) -> Self {
        Self {
            silo_id,
            endpoint: endpoint.into(),
            generation,
            status: SiloStatus::Joining,
            last_heartbeat: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SiloStatus::Active
    }

    pub fn heartbeat_age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.last_heartbeat)
    }
}

/// A membership table change, delivered on the change notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipChange {
    Registered(SiloInfo),
    StatusChanged { silo_id: SiloId, status: SiloStatus },
    HeartbeatReceived { silo_id: SiloId },
    Evicted { silo_id: SiloId },
}
