//! # Reminders Feature
//!
//! In-memory reminder store and cancellable scheduler with a single
//! follow-up notification for unacknowledged reminders.
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod model;
pub mod scheduler;
pub mod store;

pub use model::{CategoryGroup, ListEntry, NewReminder, Reminder, ReminderId};
pub use scheduler::{ReminderScheduler, ScheduleError, TimerStatus, FOLLOW_UP_INTERVAL};
pub use store::ReminderStore;
