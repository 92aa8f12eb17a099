//! Reminder record and identifier types.

use chrono::{NaiveDateTime, Timelike};
use std::time::Duration;

use crate::core::ChatId;

/// Opaque reminder identifier, `"<chat>_<fire instant nanos>"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderId(String);

impl ReminderId {
    /// Identifier derived from the owning chat and the fire instant.
    /// `bump` disambiguates reminders created for the same instant.
    pub fn derive(chat_id: ChatId, fire_at: &NaiveDateTime, bump: u32) -> Self {
        let nanos = fire_at.and_utc().timestamp() as i128 * 1_000_000_000
            + fire_at.nanosecond() as i128
            + bump as i128;
        ReminderId(format!("{chat_id}_{nanos}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReminderId {
    fn from(value: &str) -> Self {
        ReminderId(value.to_string())
    }
}

impl From<String> for ReminderId {
    fn from(value: String) -> Self {
        ReminderId(value)
    }
}

impl std::fmt::Display for ReminderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub id: ReminderId,

    /// Owning conversation; nothing is visible across chats
    pub chat_id: ChatId,

    /// What to remind about, never empty
    pub note: String,

    /// Local wall-clock fire instant
    pub fire_at: NaiveDateTime,

    pub category: String,

    /// Captured from the chat's repeat toggle at creation time
    pub repeat_enabled: bool,

    /// Set once the user acknowledged delivery
    pub completed: bool,

    /// Set once the primary notification went out
    pub fired: bool,
}

impl Reminder {
    /// Time left until `fire_at`, whole seconds, zero once due
    pub fn remaining(&self, now: NaiveDateTime) -> Duration {
        let seconds = self.fire_at.signed_duration_since(now).num_seconds();
        Duration::from_secs(seconds.max(0) as u64)
    }
}

/// Input for [`ReminderScheduler::schedule`](super::ReminderScheduler::schedule)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub chat_id: ChatId,
    pub note: String,
    pub fire_at: NaiveDateTime,
    pub category: String,
    pub repeat_enabled: bool,
}

/// One row of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: ReminderId,
    pub note: String,
    pub fire_at: NaiveDateTime,
    pub remaining: Duration,
    pub fired: bool,
    pub completed: bool,
}

/// Reminders of one category, in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub reminders: Vec<ListEntry>,
}
