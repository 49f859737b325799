//! # quark — a distributed virtual-actor runtime
//!
//! Actors in this crate are virtual: they are identified by
//! `(actor_type, actor_id)` rather than by a process or mailbox handle,
//! they activate on demand the first time a message targets them, and
//! they deactivate after an idle period — the silo hosting an actor is
//! an implementation detail the caller never names. A consistent hash
//! ring gives every silo in the cluster the same answer to "who owns
//! this actor" without a central directory, and supervision restarts
//! a failed activation according to the same OneForOne/AllForOne/
//! RestForOne vocabulary Erlang/OTP popularized.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quark::prelude::*;
//! use async_trait::async_trait;
//! use bytes::Bytes;
//!
//! struct Counter {
//!     count: u64,
//! }
//!
//! #[async_trait]
//! impl Actor for Counter {
//!     type Error = std::convert::Infallible;
//!
//!     async fn dispatch(
//!         &mut self,
//!         method: &str,
//!         payload: Bytes,
//!         _ctx: &mut ActorContext<'_>,
//!     ) -> Result<Bytes, Self::Error> {
//!         match method {
//!             "increment" => {
//!                 self.count += 1;
//!                 Ok(Bytes::new())
//!             }
//!             _ => Ok(Bytes::new()),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SiloConfig::builder(SiloId::new("silo-1"), "127.0.0.1:7000").build()?;
//!     let coordinator = SiloCoordinator::new(config, transport, membership, reminders);
//!     coordinator.register_actor_type("Counter", CounterFactory, Default::default());
//!     coordinator.join_cluster().await?;
//!     coordinator.run();
//!
//!     coordinator
//!         .call(ActorRef::new("Counter", "shard-1"), "increment", Bytes::new())
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Placement and membership
//! - [`ring`] — consistent hash ring mapping actor keys to owning silos
//! - [`membership`] — cluster membership table, heartbeats, failure detection
//! - [`transport`] — reliable envelope transport between silos
//!
//! ## Actor runtime
//! - [`actor`] — the `Actor` trait, lifecycle hooks, and dispatch context
//! - [`activation`] — activation registry and per-instance dispatcher
//! - [`message`] — the wire `Envelope`
//! - [`mailbox`] — bounded per-instance queuing with backpressure
//! - [`codec`] — per-method request/response encoding
//! - [`chain`] — call-chain tracking and reentrancy detection
//! - [`reminder`] — durable scheduled wake-ups for virtual actors
//!
//! ## Fault tolerance and observability
//! - [`supervisor`] — restart policy and backoff bookkeeping
//! - [`monitoring`] — event tracking for observability
//!
//! ## Wiring
//! - [`silo`] — [`silo::SiloCoordinator`], the single type an embedding
//!   application constructs: it owns activation, placement, transport,
//!   membership, and supervision for one process.
//! - [`util`] — shared identifiers (`ActorRef`, `SiloId`, `ChainId`, `MessageId`)
//!
//! # Architecture Principles
//!
//! ## Location transparency
//! Callers address actors by `(actor_type, actor_id)`; the ring decides
//! which silo owns that key, and the coordinator transparently routes
//! locally or over the transport layer.
//!
//! ## Zero-cost abstractions
//! - Generic constraints (`MembershipTable`, `ReminderTable`, `Transport`)
//!   over trait objects at the module seams that benefit from static
//!   dispatch; `dyn` is used only at the activation boundary, where a
//!   single runtime-registered factory table must construct arbitrarily
//!   many concrete actor types by name.
//!
//! ## At-most-once concurrent execution
//! Each activation has exactly one dispatcher task draining its
//! mailbox; reentrant calls from within a turn are chain-tracked rather
//! than mutex-guarded.

// Layer 1: Standard library
// (none at crate root)

// Layer 2: Third-party
// (none at crate root)

// Layer 3: Internal
pub mod activation;
pub mod actor;
pub mod chain;
pub mod codec;
pub mod mailbox;
pub mod membership;
pub mod message;
pub mod monitoring;
pub mod prelude;
pub mod reminder;
pub mod ring;
pub mod silo;
pub mod supervisor;
pub mod transport;
pub mod util;

// Re-export commonly used types
pub use actor::{Actor, ActorContext, ActorError, ErrorAction, OutboundCaller};
pub use activation::{ActivationError, ActorFactory, ActorTypeRegistry};
pub use chain::{ChainError, ChainMeta};
pub use codec::{CodecError, CodecRegistry};
pub use mailbox::{
    BackpressureStrategy, BoundedMailbox, BoundedMailboxSender, MailboxError, MailboxReceiver,
    MailboxSender,
};
pub use membership::{InMemoryMembershipTable, MembershipError, MembershipTable, SiloStatus};
pub use message::Envelope;
pub use monitoring::{
    ActorEvent, ActorEventKind, EventSeverity, InMemoryMonitor, Monitor, MonitoringConfig,
    MonitoringError, MonitoringEvent, MonitoringSnapshot, SupervisionEvent, SupervisionEventKind,
};
pub use reminder::{InMemoryReminderTable, Reminder, ReminderError, ReminderId, ReminderTable};
pub use ring::{HashRing, RingError, RingHandle};
pub use silo::{SiloConfig, SiloConfigBuilder, SiloCoordinator, SiloError, SupervisionStrategy};
pub use supervisor::{RestartBackoff, RestartPolicy, ShutdownPolicy};
pub use transport::{ClusterFabric, LocalTransport, Transport, TransportError};
pub use util::{ActorRef, ChainId, MessageId, SiloId};
