//! Convenient re-exports for building on this runtime.
//!
//! ```rust
//! use quark::prelude::*;
//! ```
//!
//! # What's Included
//!
//! ## Core actor runtime
//! - [`Actor`] - Trait every activated actor type implements
//! - [`ActorContext`] - Per-turn context (outbound calls, chain metadata)
//! - [`ErrorAction`] - What a dispatch error tells the supervisor to do
//! - [`Envelope`] - The wire envelope shared by requests and responses
//!
//! ## Silo wiring
//! - [`SiloCoordinator`] - The type an embedding application constructs
//! - [`SiloConfig`] / [`SiloConfigBuilder`] - Silo configuration surface
//! - [`SupervisionStrategy`] - OneForOne / AllForOne / RestForOne
//!
//! ## Mailbox
//! - [`BoundedMailbox`] - Capacity-limited per-instance mailbox
//! - [`BackpressureStrategy`] - Overflow policy
//! - [`MailboxReceiver`] / [`MailboxSender`] - Mailbox endpoints
//!
//! ## Supervision
//! - [`RestartPolicy`] - When to restart (Permanent, Transient, Temporary)
//! - [`ShutdownPolicy`] - How to stop (Graceful, Immediate, Infinity)
//!
//! ## Monitoring
//! - [`Monitor`] - Core monitoring trait
//! - [`InMemoryMonitor`] - Bounded in-memory event recorder
//! - [`MonitoringEvent`] - Trait implemented by every event kind
//! - [`EventSeverity`] - Event severity levels
//! - [`ActorEvent`] / [`SupervisionEvent`] - Actor and supervision events
//!
//! ## Identifiers
//! - [`ActorRef`] - `(actor_type, actor_id)` key identifying a virtual actor
//! - [`SiloId`] - Identifies one silo process in the cluster
//! - [`ChainId`] / [`MessageId`] - Call-chain and message correlation IDs

// Core actor runtime
pub use crate::actor::{Actor, ActorContext, ActorError, ErrorAction, OutboundCaller};
pub use crate::message::Envelope;

// Silo wiring
pub use crate::silo::{SiloConfig, SiloConfigBuilder, SiloCoordinator, SiloError, SupervisionStrategy};

// Mailbox
pub use crate::mailbox::{
    BackpressureStrategy, BoundedMailbox, BoundedMailboxSender, MailboxError, MailboxReceiver,
    MailboxSender,
};

// Supervision
pub use crate::supervisor::{RestartBackoff, RestartPolicy, ShutdownPolicy};

// Monitoring
pub use crate::monitoring::{
    ActorEvent, EventSeverity, InMemoryMonitor, Monitor, MonitoringEvent, SupervisionEvent,
};

// Cluster infrastructure
pub use crate::membership::{InMemoryMembershipTable, MembershipTable};
pub use crate::reminder::{InMemoryReminderTable, ReminderTable};
pub use crate::ring::{HashRing, RingHandle};
pub use crate::transport::{ClusterFabric, LocalTransport, Transport};

// Identifiers
pub use crate::util::{ActorRef, ChainId, MessageId, SiloId};
