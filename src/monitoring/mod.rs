//! # Monitoring Module
//!
//! Universal monitoring infrastructure for observing and tracking events across all runtime components.
//!
//! ## Features
//! - **Generic Monitor<E> Trait**: Universal monitoring for any entity type
//! - **Zero-Cost Abstraction**: `NoopMonitor` compiles away when disabled
//! - **Lock-Free Recording**: Atomic counters for concurrent event tracking
//! - **Type Safety**: `MonitoringEvent` trait ensures compile-time correctness
//!
//! ## Event Types
//! - `ActorEvent`: actor lifecycle and method dispatch
//! - `SupervisionEvent`: restart decisions and child lifecycle
//! - `SiloEvent`: silo membership and coordinator lifecycle
//! - `RingEvent`: consistent-hash ring placement changes
//! - `MembershipEvent`: heartbeat and suspicion tracking
//! - `TransportEvent`: inter-silo envelope delivery
//! - `ReminderEvent`: durable reminder scheduling and firing
//! - `MailboxEvent`: mailbox operations and backpressure
//!
//! ## Examples
//! ```
//! use quark::monitoring::{InMemoryMonitor, Monitor, MonitoringConfig, ActorEvent, ActorEventKind};
//! use quark::util::ActorRef;
//! use std::collections::HashMap;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MonitoringConfig::default();
//! let monitor = InMemoryMonitor::new(config);
//!
//! let event = ActorEvent {
//!     timestamp: chrono::Utc::now(),
//!     actor_ref: ActorRef::new("Counter", "shard-1"),
//!     event_kind: ActorEventKind::Activated,
//!     metadata: HashMap::new(),
//! };
//! monitor.record(event).await?;
//!
//! let snapshot = monitor.snapshot().await?;
//! assert_eq!(snapshot.total_events, 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod in_memory;
pub mod noop;
pub mod traits;
pub mod types;

pub use error::MonitoringError;
pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::{EventSeverity, Monitor, MonitoringEvent};
pub use types::{
    ActorEvent, ActorEventKind, MailboxEvent, MailboxEventKind, MembershipEvent,
    MembershipEventKind, MonitoringConfig, MonitoringSnapshot, ReminderEvent, ReminderEventKind,
    RingEvent, RingEventKind, SiloEvent, SiloEventKind, SupervisionEvent, SupervisionEventKind,
    TransportEvent, TransportEventKind,
};
