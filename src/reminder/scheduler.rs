// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use tracing::{info, warn};

// Layer 3: Internal module imports
use super::error::ReminderError;
use super::traits::ReminderTable;
use super::types::Reminder;
use crate::ring::RingHandle;
use crate::util::ids::ActorRef;
use crate::util::ids::SiloId;

/// Delivery capability the scheduler needs from the silo it runs
/// inside: hand a due reminder to its owning actor's `on_reminder`
/// hook. Implemented by the silo coordinator, which ensures the target
/// is activated and awaits the hook's outcome so the scheduler knows
/// whether to rearm/delete or leave the claim for a refire (§4.10).
#[async_trait]
pub trait ReminderFirer: Send + Sync {
    async fn fire(&self, reminder: &Reminder) -> Result<(), ReminderError>;
}

/// Tunables for [`ReminderScheduler`], drawn from the silo
/// configuration surface (`reminder_tick_interval`).
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    pub tick_interval: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// Polls the reminder table on an interval, claims and fires every due
/// row this silo owns per the hash ring, and rearms or deletes it on
/// success (§4.10).
///
/// Ownership is re-checked against the *current* ring snapshot on every
/// tick rather than cached, so a reminder whose owner changed under a
/// membership change is picked up by its new owner on the very next
/// tick without any explicit handoff.
pub struct ReminderScheduler<T: ReminderTable> {
    table: Arc<T>,
    ring: RingHandle,
    self_id: SiloId,
    firer: Arc<dyn ReminderFirer>,
    config: ReminderSchedulerConfig,
}

impl<T: ReminderTable + 'static> ReminderScheduler<T> {
    pub fn new(
        table: Arc<T>,
        ring: RingHandle,
        self_id: SiloId,
        firer: Arc<dyn ReminderFirer>,
        config: ReminderSchedulerConfig,
    ) -> Self {
        Self {
            table,
            ring,
            self_id,
            firer,
            config,
        }
    }

    /// Runs the tick loop until cancelled. Intended to be spawned as a
    /// long-lived task by the silo coordinator.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        loop {
            interval.tick().await;
            self.run_tick().await;
        }
    }

    /// One scan-claim-fire round, exposed separately so tests can drive
    /// it deterministically instead of waiting on the interval.
    pub async fn run_tick(&self) {
        let now = chrono::Utc::now();
        for reminder in self.table.list_due(now).await {
            self.try_fire_one(reminder, now).await;
        }
    }

    async fn try_fire_one(&self, reminder: Reminder, now: chrono::DateTime<chrono::Utc>) {
        let key = ActorRef::new(reminder.owner_actor_type.clone(), reminder.owner_actor_id.clone()).placement_key();
        match self.ring.owner_of(key) {
            Ok(owner) if owner == self.self_id => {}
            Ok(_) => return, // owned by a different silo; its own scheduler will claim it
            Err(err) => {
                warn!(error = %err, reminder_id = %reminder.id, "no ring owner for reminder, skipping tick");
                return;
            }
        }

        match self.table.claim(reminder.id, now, self.self_id.as_str()).await {
            Ok(true) => {}
            Ok(false) => return, // lost the race to another silo
            Err(err) => {
                warn!(error = %err, reminder_id = %reminder.id, "claim failed");
                return;
            }
        }

        match self.firer.fire(&reminder).await {
            Ok(()) => {
                let mut fired = reminder;
                if fired.period.is_some() {
                    fired.rearm();
                    if let Err(err) = self.table.update_next(fired.id, fired.due_at).await {
                        warn!(error = %err, reminder_id = %fired.id, "failed to rearm reminder after firing");
                    }
                } else if let Err(err) = self.table.delete(fired.id).await {
                    warn!(error = %err, reminder_id = %fired.id, "failed to delete one-shot reminder after firing");
                }
                info!(reminder_id = %fired.id, owner = %fired.owner_actor_id, "reminder fired");
            }
            Err(err) => {
                warn!(error = %err, reminder_id = %reminder.id, "reminder callback failed, releasing claim for refire");
                if let Err(release_err) = self.table.release_claim(reminder.id).await {
                    warn!(error = %release_err, reminder_id = %reminder.id, "failed to release claim after callback failure");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reminder::in_memory::InMemoryReminderTable;
    use crate::ring::HashRing;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFirer {
        calls: AtomicUsize,
        fail_next: std::sync::atomic::AtomicBool,
    }

    impl CountingFirer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_next: std::sync::atomic::AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ReminderFirer for CountingFirer {
        async fn fire(&self, reminder: &Reminder) -> Result<(), ReminderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ReminderError::CallbackFailed {
                    id: reminder.id,
                    reason: "forced test failure".into(),
                });
            }
            Ok(())
        }
    }

    fn ring_owning_self(self_id: &SiloId) -> RingHandle {
        let ring = HashRing::empty(10).add_silo(self_id);
        RingHandle::new(ring)
    }

    #[tokio::test]
    async fn fires_owned_due_reminder_and_deletes_one_shot() {
        let self_id = SiloId::new("s1");
        let table = Arc::new(InMemoryReminderTable::new());
        let firer = Arc::new(CountingFirer::new());
        let scheduler = ReminderScheduler::new(
            Arc::clone(&table),
            ring_owning_self(&self_id),
            self_id,
            firer.clone(),
            ReminderSchedulerConfig::default(),
        );

        let due = Reminder::new("Order", "o1", "followup", chrono::Utc::now(), None, Bytes::new());
        table.upsert(due).await.unwrap();

        scheduler.run_tick().await;

        assert_eq!(firer.calls.load(Ordering::SeqCst), 1);
        assert!(table.list_due(chrono::Utc::now()).await.is_empty());
    }

    #[tokio::test]
    async fn rearms_periodic_reminder_instead_of_deleting() {
        let self_id = SiloId::new("s1");
        let table = Arc::new(InMemoryReminderTable::new());
        let firer = Arc::new(CountingFirer::new());
        let scheduler = ReminderScheduler::new(
            Arc::clone(&table),
            ring_owning_self(&self_id),
            self_id,
            firer,
            ReminderSchedulerConfig::default(),
        );

        let due = Reminder::new(
            "Order",
            "o1",
            "poll",
            chrono::Utc::now(),
            Some(Duration::from_secs(3600)),
            Bytes::new(),
        );
        table.upsert(due).await.unwrap();

        scheduler.run_tick().await;

        assert!(table.list_due(chrono::Utc::now()).await.is_empty());
        let far_future = chrono::Utc::now() + chrono::Duration::hours(2);
        assert_eq!(table.list_due(far_future).await.len(), 1);
    }

    #[tokio::test]
    async fn callback_failure_releases_claim_for_refire() {
        let self_id = SiloId::new("s1");
        let table = Arc::new(InMemoryReminderTable::new());
        let firer = Arc::new(CountingFirer::new());
        firer.fail_next.store(true, Ordering::SeqCst);
        let scheduler = ReminderScheduler::new(
            Arc::clone(&table),
            ring_owning_self(&self_id),
            self_id,
            firer.clone(),
            ReminderSchedulerConfig::default(),
        );

        let due = Reminder::new("Order", "o1", "followup", chrono::Utc::now(), None, Bytes::new());
        table.upsert(due).await.unwrap();

        scheduler.run_tick().await;
        assert_eq!(firer.calls.load(Ordering::SeqCst), 1);
        // Released claim means the row is still due and claimable again.
        assert_eq!(table.list_due(chrono::Utc::now()).await.len(), 1);

        scheduler.run_tick().await;
        assert_eq!(firer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reminder_not_owned_by_this_silo_is_left_alone() {
        let self_id = SiloId::new("s1");
        let other_ring = RingHandle::new(HashRing::empty(10).add_silo(&SiloId::new("s2")));
        let table = Arc::new(InMemoryReminderTable::new());
        let firer = Arc::new(CountingFirer::new());
        let scheduler = ReminderScheduler::new(Arc::clone(&table), other_ring, self_id, firer.clone(), ReminderSchedulerConfig::default());

        let due = Reminder::new("Order", "o1", "followup", chrono::Utc::now(), None, Bytes::new());
        table.upsert(due).await.unwrap();

        scheduler.run_tick().await;
        assert_eq!(firer.calls.load(Ordering::SeqCst), 0);
    }
}
