//! In-memory reminder store keyed by id, with a per-chat index that keeps
//! insertion order for listing.

use std::collections::HashMap;

use super::model::{Reminder, ReminderId};
use crate::core::ChatId;

#[derive(Debug, Default)]
pub struct ReminderStore {
    records: HashMap<ReminderId, Reminder>,
    by_chat: HashMap<ChatId, Vec<ReminderId>>,
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ReminderId) -> bool {
        self.records.contains_key(id)
    }

    /// Insert a record. An existing record with the same id is replaced in place.
    pub fn insert(&mut self, reminder: Reminder) {
        let id = reminder.id.clone();
        let chat_id = reminder.chat_id;
        if self.records.insert(id.clone(), reminder).is_none() {
            self.by_chat.entry(chat_id).or_default().push(id);
        }
    }

    pub fn get(&self, id: &ReminderId) -> Option<&Reminder> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &ReminderId) -> Option<&mut Reminder> {
        self.records.get_mut(id)
    }

    /// Remove a record; unknown ids are a no-op
    pub fn remove(&mut self, id: &ReminderId) -> Option<Reminder> {
        let removed = self.records.remove(id)?;
        if let Some(ids) = self.by_chat.get_mut(&removed.chat_id) {
            ids.retain(|existing| existing != id);
            if ids.is_empty() {
                self.by_chat.remove(&removed.chat_id);
            }
        }
        Some(removed)
    }

    /// Reminders of one chat in insertion order
    pub fn for_chat(&self, chat_id: ChatId) -> Vec<&Reminder> {
        self.by_chat
            .get(&chat_id)
            .map(|ids| ids.iter().filter_map(|id| self.records.get(id)).collect())
            .unwrap_or_default()
    }

    /// Most recently created reminder of a chat
    pub fn latest_for_chat_mut(&mut self, chat_id: ChatId) -> Option<&mut Reminder> {
        let id = self.by_chat.get(&chat_id)?.last()?.clone();
        self.records.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, minute, 0)
            .unwrap()
    }

    fn reminder(chat_id: ChatId, minute: u32, note: &str) -> Reminder {
        Reminder {
            id: ReminderId::derive(chat_id, &at(minute), 0),
            chat_id,
            note: note.to_string(),
            fire_at: at(minute),
            category: "Другое".to_string(),
            repeat_enabled: false,
            completed: false,
            fired: false,
        }
    }

    #[test]
    fn test_insert_and_list_in_order() {
        let mut store = ReminderStore::new();
        store.insert(reminder(1, 30, "later"));
        store.insert(reminder(1, 10, "earlier"));
        store.insert(reminder(2, 20, "other chat"));

        let notes: Vec<_> = store.for_chat(1).iter().map(|r| r.note.as_str()).collect();
        assert_eq!(notes, vec!["later", "earlier"]);
        assert_eq!(store.for_chat(2).len(), 1);
        assert!(store.for_chat(3).is_empty());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = ReminderStore::new();
        let r = reminder(1, 30, "walk");
        let id = r.id.clone();
        store.insert(r);

        assert!(store.remove(&id).is_some());
        assert!(store.remove(&id).is_none());
        assert!(!store.contains(&id));
        assert!(store.for_chat(1).is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_reinsert_same_id_keeps_single_index_entry() {
        let mut store = ReminderStore::new();
        store.insert(reminder(1, 30, "first"));
        store.insert(reminder(1, 30, "replaced"));
        let listed = store.for_chat(1);
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].note, "replaced");
    }

    #[test]
    fn test_latest_for_chat() {
        let mut store = ReminderStore::new();
        store.insert(reminder(1, 30, "first"));
        store.insert(reminder(1, 40, "second"));
        store.insert(reminder(2, 50, "foreign"));

        let latest = store.latest_for_chat_mut(1).unwrap();
        assert_eq!(latest.note, "second");
        latest.category = "Работа".to_string();
        assert_eq!(store.for_chat(1)[1].category, "Работа");
        assert!(store.latest_for_chat_mut(9).is_none());
    }
}
