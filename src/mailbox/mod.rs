//! Mailbox system for actor instance message queuing with backpressure control (§4.5).
//!
//! # Components
//!
//! - [`MailboxReceiver`] - Trait for receiving envelopes from a mailbox
//! - [`MailboxSender`] - Trait for sending envelopes to a mailbox
//! - [`BoundedMailbox`] / [`BoundedMailboxSender`] - Fixed-capacity mailbox pair
//! - [`BackpressureStrategy`] - Overflow policy (Block, DropOldest, DropNewest, Reject)
//! - [`metrics::MetricsRecorder`] / [`metrics::AtomicMetrics`] - Queue depth and throughput tracking
//!
//! # Design
//!
//! Every actor instance owns exactly one mailbox (§4.5): a bounded
//! `Envelope` queue with a configurable overflow policy, selectable per
//! actor type via the silo configuration surface. Unlike the teacher's
//! mailbox, this one is concrete over [`crate::message::Envelope`]
//! rather than generic over a `Message` trait — per-method typing
//! happens in the codec layer, not at the mailbox boundary — and is
//! built directly on `parking_lot::Mutex` + `tokio::sync::Notify`
//! instead of `tokio::sync::mpsc`, since `mpsc` offers no way to evict
//! the front of the queue (required for `DropOldest`).
//!
//! # Example
//!
//! ```rust
//! use quark::mailbox::{BoundedMailbox, BackpressureStrategy, MailboxReceiver, MailboxSender};
//! use quark::message::Envelope;
//! use bytes::Bytes;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (mut rx, tx) = BoundedMailbox::with_strategy(100, BackpressureStrategy::Block);
//!
//! tx.send(Envelope::request("Counter", "shard-1", "increment", Bytes::new()))
//!     .await
//!     .unwrap();
//!
//! let envelope = rx.recv().await.unwrap();
//! assert_eq!(envelope.method_name, "increment");
//! # }
//! ```
pub mod backpressure;
pub mod bounded;
pub mod metrics;
pub mod traits;

pub use backpressure::BackpressureStrategy;
pub use bounded::{BoundedMailbox, BoundedMailboxSender, DEFAULT_MAILBOX_CAPACITY};
pub use metrics::{AtomicMetrics, MetricsRecorder};
pub use traits::{MailboxCapacity, MailboxError, MailboxReceiver, MailboxSender, TryRecvError};
