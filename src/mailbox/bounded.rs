//! Bounded, overflow-policy-aware mailbox (§4.5).
//!
//! Built on a `parking_lot::Mutex<VecDeque<Envelope>>` guarded by a pair
//! of `tokio::sync::Notify`s rather than the teacher's `tokio::sync::mpsc`,
//! since `mpsc` has no way to evict the oldest queued item from the
//! sender side — required for `DropOldest`.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

// Layer 3: Internal module imports
use super::backpressure::BackpressureStrategy;
use super::traits::{MailboxCapacity, MailboxError, MailboxReceiver, MailboxSender, TryRecvError};
use crate::message::Envelope;

/// Default bounded mailbox capacity (§6 configuration surface).
pub const DEFAULT_MAILBOX_CAPACITY: usize = 1000;

struct Shared {
    queue: Mutex<VecDeque<Envelope>>,
    capacity: usize,
    strategy: BackpressureStrategy,
    not_empty: Notify,
    not_full: Notify,
    closed: AtomicBool,
}

/// Consumer side, owned by one actor instance's dispatcher loop.
pub struct BoundedMailbox {
    shared: Arc<Shared>,
}

/// Producer side, cheaply cloneable, shared by every caller posting to
/// this actor.
pub struct BoundedMailboxSender {
    shared: Arc<Shared>,
}

impl Clone for BoundedMailboxSender {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl BoundedMailbox {
    /// Creates a bounded mailbox pair with `capacity` and the given
    /// overflow policy.
    pub fn with_strategy(capacity: usize, strategy: BackpressureStrategy) -> (Self, BoundedMailboxSender) {
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
            strategy,
            not_empty: Notify::new(),
            not_full: Notify::new(),
            closed: AtomicBool::new(false),
        });
        (
            Self {
                shared: Arc::clone(&shared),
            },
            BoundedMailboxSender { shared },
        )
    }

    pub fn new(capacity: usize) -> (Self, BoundedMailboxSender) {
        Self::with_strategy(capacity, BackpressureStrategy::default())
    }

    /// Marks the mailbox closed and drains up to `max` remaining
    /// envelopes for the caller to fail with `MailboxClosed` (requests
    /// among them get an error response — the dispatcher's job, not
    /// this type's).
    pub fn close_and_drain(&mut self, max: usize) -> Vec<Envelope> {
        self.shared.closed.store(true, Ordering::SeqCst);
        self.shared.not_empty.notify_waiters();
        self.shared.not_full.notify_waiters();
        let mut q = self.shared.queue.lock();
        let n = max.min(q.len());
        q.drain(..n).collect()
    }
}

#[async_trait]
impl MailboxReceiver for BoundedMailbox {
    async fn recv(&mut self) -> Option<Envelope> {
        loop {
            let notified = self.shared.not_empty.notified();
            {
                let mut q = self.shared.queue.lock();
                if let Some(envelope) = q.pop_front() {
                    drop(q);
                    self.shared.not_full.notify_one();
                    return Some(envelope);
                }
                if self.shared.closed.load(Ordering::SeqCst) {
                    return None;
                }
            }
            notified.await;
        }
    }

    fn try_recv(&mut self) -> Result<Envelope, TryRecvError> {
        let mut q = self.shared.queue.lock();
        if let Some(envelope) = q.pop_front() {
            drop(q);
            self.shared.not_full.notify_one();
            return Ok(envelope);
        }
        drop(q);
        if self.shared.closed.load(Ordering::SeqCst) {
            Err(TryRecvError::Closed)
        } else {
            Err(TryRecvError::Empty)
        }
    }

    fn capacity(&self) -> MailboxCapacity {
        MailboxCapacity::Bounded(self.shared.capacity)
    }

    fn len(&self) -> usize {
        self.shared.queue.lock().len()
    }
}

#[async_trait]
impl MailboxSender for BoundedMailboxSender {
    async fn send(&self, envelope: Envelope) -> Result<bool, MailboxError> {
        loop {
            if self.shared.closed.load(Ordering::SeqCst) {
                return Err(MailboxError::Closed);
            }
            let notified = self.shared.not_full.notified();
            {
                let mut q = self.shared.queue.lock();
                if q.len() < self.shared.capacity {
                    q.push_back(envelope);
                    drop(q);
                    self.shared.not_empty.notify_one();
                    return Ok(true);
                }
                match self.shared.strategy {
                    BackpressureStrategy::Block => {}
                    BackpressureStrategy::DropOldest => {
                        q.pop_front();
                        q.push_back(envelope);
                        drop(q);
                        self.shared.not_empty.notify_one();
                        return Ok(false);
                    }
                    BackpressureStrategy::DropNewest => {
                        return Ok(false);
                    }
                    BackpressureStrategy::Reject => {
                        return Err(MailboxError::Full {
                            capacity: self.shared.capacity,
                        });
                    }
                }
            }
            notified.await;
        }
    }

    fn try_send(&self, envelope: Envelope) -> Result<(), MailboxError> {
        if self.shared.closed.load(Ordering::SeqCst) {
            return Err(MailboxError::Closed);
        }
        let mut q = self.shared.queue.lock();
        if q.len() < self.shared.capacity {
            q.push_back(envelope);
            drop(q);
            self.shared.not_empty.notify_one();
            return Ok(());
        }
        match self.shared.strategy {
            BackpressureStrategy::DropOldest => {
                q.pop_front();
                q.push_back(envelope);
                Ok(())
            }
            BackpressureStrategy::DropNewest => Ok(()),
            BackpressureStrategy::Block | BackpressureStrategy::Reject => Err(MailboxError::Full {
                capacity: self.shared.capacity,
            }),
        }
    }
}
