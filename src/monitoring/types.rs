//! Monitoring event types and configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::traits::{EventSeverity, MonitoringEvent};
use crate::util::{ActorRef, SiloId};

/// Configuration for monitoring behavior.
///
/// Controls how events are recorded, filtered, and stored in the monitor.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringConfig {
    /// Whether monitoring is enabled
    pub enabled: bool,

    /// Maximum number of events to keep in history
    pub max_history_size: usize,

    /// Minimum severity level to record (events below this are filtered)
    pub severity_filter: EventSeverity,

    /// Interval for snapshot generation (if using background snapshots)
    #[serde(with = "crate::util::duration_serde")]
    pub snapshot_interval: Duration,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_history_size: 1000,
            severity_filter: EventSeverity::Info,
            snapshot_interval: Duration::from_secs(60),
        }
    }
}

/// Snapshot of monitoring state at a point in time.
///
/// Provides queryable access to monitoring counters and recent event history.
#[derive(Debug, Clone, Serialize)]
pub struct MonitoringSnapshot<E: MonitoringEvent> {
    /// Timestamp when snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Total number of events recorded
    pub total_events: u64,

    /// Number of trace-level events
    pub trace_count: u64,

    /// Number of debug-level events
    pub debug_count: u64,

    /// Number of info-level events
    pub info_count: u64,

    /// Number of warning-level events
    pub warning_count: u64,

    /// Number of error-level events
    pub error_count: u64,

    /// Number of critical-level events
    pub critical_count: u64,

    /// Recent events (up to max_history_size)
    pub recent_events: Vec<E>,
}

// ============================================================================
// Supervision Events
// ============================================================================

/// Events related to supervisor operations and child management.
#[derive(Debug, Clone, Serialize)]
pub struct SupervisionEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// ID of the supervising silo
    pub supervisor_id: String,

    /// ID of the child actor (if applicable)
    pub child_id: Option<String>,

    /// Specific supervision event type
    pub event_kind: SupervisionEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for SupervisionEvent {
    const EVENT_TYPE: &'static str = "supervision";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            SupervisionEventKind::ChildStarted => EventSeverity::Info,
            SupervisionEventKind::ChildStopped => EventSeverity::Info,
            SupervisionEventKind::ChildFailed { .. } => EventSeverity::Error,
            SupervisionEventKind::ChildRestarted { .. } => EventSeverity::Warning,
            SupervisionEventKind::RestartLimitExceeded { .. } => EventSeverity::Critical,
            SupervisionEventKind::StrategyApplied { .. } => EventSeverity::Info,
        }
    }
}

/// Specific types of supervision events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SupervisionEventKind {
    /// Child actor successfully started
    ChildStarted,

    /// Child actor gracefully stopped
    ChildStopped,

    /// Child actor failed with error
    ChildFailed {
        /// Error message
        error: String,
        /// Current restart count
        restart_count: u32,
    },

    /// Child actor was restarted after failure
    ChildRestarted {
        /// Restart count after this restart
        restart_count: u32,
    },

    /// Restart rate limit exceeded
    RestartLimitExceeded {
        /// Number of restarts attempted
        restart_count: u32,
        /// Time window for restart limit
        #[serde(with = "crate::util::duration_serde")]
        window: Duration,
    },

    /// Supervision strategy was applied
    StrategyApplied {
        /// Name of the strategy (OneForOne, AllForOne, RestForOne)
        strategy: String,
        /// Number of children affected
        affected_count: usize,
    },
}

// ============================================================================
// Actor Events
// ============================================================================

/// Events related to actor lifecycle and message processing.
#[derive(Debug, Clone, Serialize)]
pub struct ActorEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Identity of the actor
    pub actor_ref: ActorRef,

    /// Specific actor event type
    pub event_kind: ActorEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ActorEvent {
    const EVENT_TYPE: &'static str = "actor";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ActorEventKind::Spawned => EventSeverity::Debug,
            ActorEventKind::Activated => EventSeverity::Info,
            ActorEventKind::MessageReceived { .. } => EventSeverity::Trace,
            ActorEventKind::MessageProcessed { .. } => EventSeverity::Trace,
            ActorEventKind::ErrorOccurred { .. } => EventSeverity::Error,
            ActorEventKind::Deactivated => EventSeverity::Info,
        }
    }
}

/// Specific types of actor events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ActorEventKind {
    /// Actor instance allocated in memory, before `on_activate` runs
    Spawned,

    /// Actor finished activation and is ready to dispatch
    Activated,

    /// Actor received a method call
    MessageReceived {
        /// Method name
        method_name: String,
    },

    /// Actor finished processing a method call
    MessageProcessed {
        /// Method name
        method_name: String,
        /// Processing duration in microseconds
        duration_micros: u64,
    },

    /// Error occurred during actor execution
    ErrorOccurred {
        /// Error message
        error: String,
    },

    /// Actor deactivated and evicted from the silo
    Deactivated,
}

// ============================================================================
// Silo Events
// ============================================================================

/// Events related to silo membership and coordinator lifecycle.
#[derive(Debug, Clone, Serialize)]
pub struct SiloEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific silo event type
    pub event_kind: SiloEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for SiloEvent {
    const EVENT_TYPE: &'static str = "silo";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            SiloEventKind::Started { .. } => EventSeverity::Info,
            SiloEventKind::Joined { .. } => EventSeverity::Info,
            SiloEventKind::Left { .. } => EventSeverity::Warning,
            SiloEventKind::Suspected { .. } => EventSeverity::Warning,
            SiloEventKind::Shutdown { .. } => EventSeverity::Info,
        }
    }
}

/// Specific types of silo events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SiloEventKind {
    /// This silo finished startup and is accepting activations
    Started {
        /// This silo's identity
        silo_id: SiloId,
    },

    /// A peer silo joined the membership view
    Joined {
        /// The silo that joined
        silo_id: SiloId,
    },

    /// A peer silo left the membership view gracefully
    Left {
        /// The silo that left
        silo_id: SiloId,
    },

    /// A peer silo missed enough heartbeats to be marked suspect
    Suspected {
        /// The suspect silo
        silo_id: SiloId,
    },

    /// This silo began graceful shutdown
    Shutdown {
        /// This silo's identity
        silo_id: SiloId,
    },
}

// ============================================================================
// Ring Events
// ============================================================================

/// Events related to consistent-hash ring placement changes.
#[derive(Debug, Clone, Serialize)]
pub struct RingEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific ring event type
    pub event_kind: RingEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for RingEvent {
    const EVENT_TYPE: &'static str = "ring";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            RingEventKind::SiloAdded { .. } => EventSeverity::Info,
            RingEventKind::SiloRemoved { .. } => EventSeverity::Info,
            RingEventKind::Published { .. } => EventSeverity::Debug,
        }
    }
}

/// Specific types of ring events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum RingEventKind {
    /// A silo was added to the ring
    SiloAdded {
        /// Silo added
        silo_id: SiloId,
        /// Ring membership size after the add
        silo_count: usize,
    },

    /// A silo was removed from the ring
    SiloRemoved {
        /// Silo removed
        silo_id: SiloId,
        /// Ring membership size after the removal
        silo_count: usize,
    },

    /// A new ring snapshot was published to readers
    Published {
        /// Ring membership size at publish time
        silo_count: usize,
    },
}

// ============================================================================
// Membership Events
// ============================================================================

/// Events related to cluster membership table changes.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific membership event type
    pub event_kind: MembershipEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for MembershipEvent {
    const EVENT_TYPE: &'static str = "membership";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            MembershipEventKind::HeartbeatReceived { .. } => EventSeverity::Trace,
            MembershipEventKind::HeartbeatMissed { .. } => EventSeverity::Warning,
            MembershipEventKind::StatusChanged { .. } => EventSeverity::Info,
        }
    }
}

/// Specific types of membership events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MembershipEventKind {
    /// A heartbeat from a peer silo was recorded
    HeartbeatReceived {
        /// The silo that sent the heartbeat
        silo_id: SiloId,
    },

    /// A peer silo's heartbeat deadline elapsed
    HeartbeatMissed {
        /// The silo whose heartbeat was missed
        silo_id: SiloId,
    },

    /// A silo's membership status changed
    StatusChanged {
        /// The silo whose status changed
        silo_id: SiloId,
        /// New status, rendered as its `Display` form
        status: String,
    },
}

// ============================================================================
// Transport Events
// ============================================================================

/// Events related to inter-silo transport operations.
#[derive(Debug, Clone, Serialize)]
pub struct TransportEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific transport event type
    pub event_kind: TransportEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for TransportEvent {
    const EVENT_TYPE: &'static str = "transport";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            TransportEventKind::EnvelopeSent { .. } => EventSeverity::Trace,
            TransportEventKind::EnvelopeReceived { .. } => EventSeverity::Trace,
            TransportEventKind::SendFailed { .. } => EventSeverity::Error,
        }
    }
}

/// Specific types of transport events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum TransportEventKind {
    /// An envelope was handed to the transport for delivery to another silo
    EnvelopeSent {
        /// Destination silo
        destination: SiloId,
    },

    /// An envelope arrived from another silo
    EnvelopeReceived {
        /// Originating silo
        origin: SiloId,
    },

    /// Delivery to another silo failed
    SendFailed {
        /// Destination silo
        destination: SiloId,
        /// Failure reason
        reason: String,
    },
}

// ============================================================================
// Reminder Events
// ============================================================================

/// Events related to durable reminder scheduling and firing.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderEvent {
    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Actor the reminder is registered against
    pub actor_ref: ActorRef,

    /// Specific reminder event type
    pub event_kind: ReminderEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for ReminderEvent {
    const EVENT_TYPE: &'static str = "reminder";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            ReminderEventKind::Registered { .. } => EventSeverity::Info,
            ReminderEventKind::Cancelled { .. } => EventSeverity::Info,
            ReminderEventKind::Fired { .. } => EventSeverity::Debug,
            ReminderEventKind::DeliveryFailed { .. } => EventSeverity::Error,
        }
    }
}

/// Specific types of reminder events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ReminderEventKind {
    /// A reminder was registered
    Registered {
        /// Reminder name
        name: String,
    },

    /// A reminder was cancelled before firing
    Cancelled {
        /// Reminder name
        name: String,
    },

    /// A reminder fired and was delivered to the actor
    Fired {
        /// Reminder name
        name: String,
    },

    /// A reminder fired but delivery to the actor failed
    DeliveryFailed {
        /// Reminder name
        name: String,
        /// Failure reason
        reason: String,
    },
}

// ============================================================================
// Mailbox Events
// ============================================================================

/// Events related to mailbox operations and backpressure.
#[derive(Debug, Clone, Serialize)]
pub struct MailboxEvent {
    /// Identity of the actor owning the mailbox
    pub actor_ref: ActorRef,

    /// Timestamp when event occurred
    pub timestamp: DateTime<Utc>,

    /// Specific mailbox event type
    pub event_kind: MailboxEventKind,

    /// Additional event metadata
    pub metadata: HashMap<String, String>,
}

impl MonitoringEvent for MailboxEvent {
    const EVENT_TYPE: &'static str = "mailbox";

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn severity(&self) -> EventSeverity {
        match &self.event_kind {
            MailboxEventKind::MessageEnqueued { .. } => EventSeverity::Trace,
            MailboxEventKind::MessageDequeued { .. } => EventSeverity::Trace,
            MailboxEventKind::BackpressureApplied { .. } => EventSeverity::Warning,
            MailboxEventKind::CapacityReached => EventSeverity::Warning,
            MailboxEventKind::MessageDropped { .. } => EventSeverity::Error,
        }
    }
}

/// Specific types of mailbox events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum MailboxEventKind {
    /// Message enqueued in mailbox
    MessageEnqueued {
        /// Current queue size
        queue_size: usize,
    },

    /// Message dequeued from mailbox
    MessageDequeued {
        /// Remaining queue size
        queue_size: usize,
    },

    /// Backpressure strategy applied
    BackpressureApplied {
        /// Strategy applied (Block, DropOldest, DropNewest, Reject)
        strategy: String,
    },

    /// Mailbox capacity reached
    CapacityReached,

    /// Message dropped due to backpressure
    MessageDropped {
        /// Reason for dropping
        reason: String,
    },
}
