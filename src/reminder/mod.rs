//! Durable scheduled wake-ups for virtual actors (§3 "Reminder", §4.10).

pub mod error;
pub mod in_memory;
pub mod scheduler;
pub mod traits;
pub mod types;

pub use error::ReminderError;
pub use in_memory::InMemoryReminderTable;
pub use scheduler::{ReminderFirer, ReminderScheduler, ReminderSchedulerConfig};
pub use traits::ReminderTable;
pub use types::{Reminder, ReminderId};
