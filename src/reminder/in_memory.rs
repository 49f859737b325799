// Layer 1: Standard library imports
use std::sync::Arc;

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::error::ReminderError;
use super::traits::ReminderTable;
use super::types::{Reminder, ReminderId};

/// In-process reference implementation of [`ReminderTable`], backed by a
/// `DashMap`. Suitable for tests and single-process deployments; real
/// clusters back this with a table that actually survives a process
/// restart, since reminders are specified to (§3 "Reminder": "persisted
/// in an external reminder table ... survive silo restarts").
#[derive(Clone, Default)]
pub struct InMemoryReminderTable {
    rows: Arc<DashMap<ReminderId, Reminder>>,
}

impl InMemoryReminderTable {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderTable for InMemoryReminderTable {
    async fn upsert(&self, reminder: Reminder) -> Result<ReminderId, ReminderError> {
        let existing_id = self.rows.iter().find_map(|entry| {
            let row = entry.value();
            (row.owner_actor_type == reminder.owner_actor_type
                && row.owner_actor_id == reminder.owner_actor_id
                && row.name == reminder.name)
                .then_some(*entry.key())
        });

        if let Some(id) = existing_id {
            let mut row = reminder;
            row.id = id;
            self.rows.insert(id, row);
            Ok(id)
        } else {
            let id = reminder.id;
            self.rows.insert(id, reminder);
            Ok(id)
        }
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Vec<Reminder> {
        self.rows
            .iter()
            .filter(|e| e.value().is_due(now))
            .map(|e| e.value().clone())
            .collect()
    }

    async fn claim(&self, id: ReminderId, _now: DateTime<Utc>, by_silo: &str) -> Result<bool, ReminderError> {
        let mut row = self.rows.get_mut(&id).ok_or(ReminderError::NotFound(id))?;
        match &row.claimed_by {
            None => {
                row.claimed_by = Some(by_silo.to_string());
                Ok(true)
            }
            Some(owner) if owner == by_silo => Ok(true),
            Some(_) => Ok(false),
        }
    }

    async fn delete(&self, id: ReminderId) -> Result<(), ReminderError> {
        self.rows.remove(&id).ok_or(ReminderError::NotFound(id))?;
        Ok(())
    }

    async fn update_next(&self, id: ReminderId, new_due: DateTime<Utc>) -> Result<(), ReminderError> {
        let mut row = self.rows.get_mut(&id).ok_or(ReminderError::NotFound(id))?;
        row.due_at = new_due;
        row.claimed_by = None;
        Ok(())
    }

    async fn release_claim(&self, id: ReminderId) -> Result<(), ReminderError> {
        let mut row = self.rows.get_mut(&id).ok_or(ReminderError::NotFound(id))?;
        row.claimed_by = None;
        Ok(())
    }
}
