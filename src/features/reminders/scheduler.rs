//! # Reminder Scheduler
//!
//! Owns the reminder store and one cancellable tokio task per armed timer.
//! A single mutex guards both the store and the timer map; timer tasks take
//! the same lock before touching shared state and release it before any
//! outbound delivery.
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Delayed-task timers with abort-on-cancel; acknowledgement keeps the record
//! - 1.0.0: Initial release with primary notification and single follow-up

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::model::{CategoryGroup, ListEntry, NewReminder, Reminder, ReminderId};
use super::store::ReminderStore;
use crate::core::{ChatId, Clock};
use crate::delivery::{Control, DeliveryGateway, OutboundMessage, ReminderAction};

/// Delay between the primary notification and the single follow-up
pub const FOLLOW_UP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("reminder note is empty")]
    EmptyNote,

    #[error("time {fire_at} has already passed")]
    TimeAlreadyPassed { fire_at: NaiveDateTime },
}

/// Which timers are currently armed for a reminder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStatus {
    pub primary: bool,
    pub follow_up: bool,
}

#[derive(Default)]
struct TimerSlot {
    primary: Option<JoinHandle<()>>,
    follow_up: Option<JoinHandle<()>>,
}

impl TimerSlot {
    fn abort_all(&mut self) {
        if let Some(handle) = self.primary.take() {
            handle.abort();
        }
        if let Some(handle) = self.follow_up.take() {
            handle.abort();
        }
    }

    fn is_empty(&self) -> bool {
        self.primary.is_none() && self.follow_up.is_none()
    }
}

#[derive(Default)]
struct SchedulerState {
    store: ReminderStore,
    timers: HashMap<ReminderId, TimerSlot>,
}

impl SchedulerState {
    fn prune_slot(&mut self, id: &ReminderId) {
        if self.timers.get(id).is_some_and(TimerSlot::is_empty) {
            self.timers.remove(id);
        }
    }
}

#[derive(Clone)]
pub struct ReminderScheduler {
    state: Arc<Mutex<SchedulerState>>,
    gateway: Arc<dyn DeliveryGateway>,
    clock: Arc<dyn Clock>,
}

impl ReminderScheduler {
    pub fn new(gateway: Arc<dyn DeliveryGateway>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SchedulerState::default())),
            gateway,
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Store a reminder and arm its primary timer
    pub async fn schedule(&self, new: NewReminder) -> Result<ReminderId, ScheduleError> {
        let note = new.note.trim().to_string();
        if note.is_empty() {
            return Err(ScheduleError::EmptyNote);
        }

        let now = self.clock.now();
        if new.fire_at <= now {
            return Err(ScheduleError::TimeAlreadyPassed {
                fire_at: new.fire_at,
            });
        }
        let delay = new.fire_at.signed_duration_since(now).to_std().unwrap_or_default();

        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let mut bump = 0;
        let mut id = ReminderId::derive(new.chat_id, &new.fire_at, bump);
        while state.store.contains(&id) {
            bump += 1;
            id = ReminderId::derive(new.chat_id, &new.fire_at, bump);
        }

        state.store.insert(Reminder {
            id: id.clone(),
            chat_id: new.chat_id,
            note,
            fire_at: new.fire_at,
            category: new.category,
            repeat_enabled: new.repeat_enabled,
            completed: false,
            fired: false,
        });

        let handle = self.spawn_primary(id.clone(), delay);
        state.timers.entry(id.clone()).or_default().primary = Some(handle);

        info!(
            "Scheduled reminder {} for chat {} at {} (in {}s, repeat: {})",
            id,
            new.chat_id,
            new.fire_at,
            delay.as_secs(),
            new.repeat_enabled
        );
        Ok(id)
    }

    /// Mark a reminder done and drop its pending follow-up. The record stays.
    pub async fn acknowledge(&self, id: &ReminderId) -> bool {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let Some(reminder) = state.store.get_mut(id) else {
            debug!("Acknowledge for unknown reminder {id} ignored");
            return false;
        };
        reminder.completed = true;

        if let Some(handle) = state.timers.get_mut(id).and_then(|slot| slot.follow_up.take()) {
            handle.abort();
        }
        state.prune_slot(id);

        info!("Reminder {id} acknowledged");
        true
    }

    /// Abort every timer of a reminder and remove it. Unknown ids are a no-op.
    pub async fn cancel(&self, id: &ReminderId) -> bool {
        let mut guard = self.state.lock().await;
        if let Some(mut slot) = guard.timers.remove(id) {
            slot.abort_all();
        }
        let removed = guard.store.remove(id).is_some();
        if removed {
            info!("Reminder {id} cancelled");
        } else {
            debug!("Cancel for unknown reminder {id} ignored");
        }
        removed
    }

    /// Reminders of one chat grouped by category (sorted), insertion order inside
    pub async fn list(&self, chat_id: ChatId) -> Vec<CategoryGroup> {
        let now = self.clock.now();
        let guard = self.state.lock().await;

        let mut groups: BTreeMap<String, Vec<ListEntry>> = BTreeMap::new();
        for reminder in guard.store.for_chat(chat_id) {
            groups
                .entry(reminder.category.clone())
                .or_default()
                .push(ListEntry {
                    id: reminder.id.clone(),
                    note: reminder.note.clone(),
                    fire_at: reminder.fire_at,
                    remaining: reminder.remaining(now),
                    fired: reminder.fired,
                    completed: reminder.completed,
                });
        }

        groups
            .into_iter()
            .map(|(category, reminders)| CategoryGroup {
                category,
                reminders,
            })
            .collect()
    }

    /// Relabel the chat's most recent reminder
    pub async fn recategorize_latest(&self, chat_id: ChatId, category: &str) -> Option<ReminderId> {
        let mut guard = self.state.lock().await;
        let reminder = guard.store.latest_for_chat_mut(chat_id)?;
        reminder.category = category.to_string();
        Some(reminder.id.clone())
    }

    pub async fn get(&self, id: &ReminderId) -> Option<Reminder> {
        self.state.lock().await.store.get(id).cloned()
    }

    /// Chat owning a reminder, if it still exists
    pub async fn owner_of(&self, id: &ReminderId) -> Option<ChatId> {
        self.state.lock().await.store.get(id).map(|r| r.chat_id)
    }

    pub async fn timer_status(&self, id: &ReminderId) -> TimerStatus {
        let guard = self.state.lock().await;
        guard
            .timers
            .get(id)
            .map(|slot| TimerStatus {
                primary: slot.primary.as_ref().is_some_and(|h| !h.is_finished()),
                follow_up: slot.follow_up.as_ref().is_some_and(|h| !h.is_finished()),
            })
            .unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.store.len()
    }

    /// Abort every armed timer, leaving records in place
    pub async fn shutdown(&self) {
        let mut guard = self.state.lock().await;
        let armed = guard.timers.len();
        for (_, mut slot) in guard.timers.drain() {
            slot.abort_all();
        }
        info!("Reminder scheduler stopped ({armed} armed timers aborted)");
    }

    fn spawn_primary(&self, id: ReminderId, delay: Duration) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            sleep(delay).await;
            scheduler.fire(id).await;
        })
    }

    fn spawn_follow_up(&self, id: ReminderId) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move {
            sleep(FOLLOW_UP_INTERVAL).await;
            scheduler.follow_up(id).await;
        })
    }

    async fn fire(&self, id: ReminderId) {
        let (chat_id, note, repeat) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            let Some(reminder) = state.store.get_mut(&id) else {
                return;
            };
            reminder.fired = true;
            let snapshot = (reminder.chat_id, reminder.note.clone(), reminder.repeat_enabled);

            if let Some(slot) = state.timers.get_mut(&id) {
                slot.primary = None;
            }
            state.prune_slot(&id);
            snapshot
        };

        info!("Reminder {id} fired for chat {chat_id}");

        let mut controls = Vec::with_capacity(2);
        if repeat {
            controls.push(Control::new(ReminderAction::Acknowledge, id.clone()));
        }
        controls.push(Control::new(ReminderAction::Delete, id.clone()));
        self.send(
            chat_id,
            OutboundMessage::with_controls(format!("🔔 Напоминание: {note}"), controls),
        )
        .await;

        if !repeat {
            return;
        }

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let pending = state.store.get(&id).is_some_and(|r| !r.completed);
        if !pending {
            debug!("Reminder {id} resolved during delivery, no follow-up armed");
            return;
        }
        let handle = self.spawn_follow_up(id.clone());
        state.timers.entry(id).or_default().follow_up = Some(handle);
    }

    async fn follow_up(&self, id: ReminderId) {
        let (chat_id, note) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            let Some(reminder) = state.store.get(&id) else {
                return;
            };
            if reminder.completed {
                return;
            }
            let snapshot = (reminder.chat_id, reminder.note.clone());

            if let Some(slot) = state.timers.get_mut(&id) {
                slot.follow_up = None;
            }
            state.prune_slot(&id);
            snapshot
        };

        info!("Follow-up for reminder {id} sent to chat {chat_id}");
        self.send(
            chat_id,
            OutboundMessage::with_controls(
                format!("🔁 Повтор: {note}"),
                vec![
                    Control::new(ReminderAction::Acknowledge, id.clone()),
                    Control::new(ReminderAction::Delete, id),
                ],
            ),
        )
        .await;
    }

    async fn send(&self, chat_id: ChatId, message: OutboundMessage) {
        if let Err(e) = self.gateway.deliver(chat_id, message).await {
            warn!("Failed to deliver reminder message to chat {chat_id}: {e}");
        }
    }
}
