//! # Reminder Service
//!
//! Entry point for inbound chat events. Decides, per chat, whether a message
//! is a command, a fresh note, a time reply or a category name, and drives the
//! parser, classifier and scheduler accordingly. Nothing in here returns an
//! error to the transport: failures become a reply to the user and a log line.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.2.0: Sticky category also relabels the chat's latest reminder
//! - 1.1.0: Note and time accepted in a single message
//! - 1.0.0: Two-step dialogue (note, then time)

use anyhow::Result;
use chrono::NaiveDateTime;
use dashmap::DashMap;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::command::{
    Command, MENU_ADD_CATEGORY, MENU_LIST, MENU_REMIND, MENU_REPEAT_OFF, MENU_REPEAT_ON,
};
use crate::core::{format_fire_at, format_remaining, ChatId, Clock};
use crate::delivery::{Control, DeliveryGateway, OutboundMessage, ReminderAction, MAX_CONTROLS};
use crate::features::categories::CategoryClassifier;
use crate::features::conversation::{ConversationState, ConversationTracker};
use crate::features::reminders::{
    CategoryGroup, ListEntry, NewReminder, ReminderId, ReminderScheduler, ScheduleError,
};
use crate::features::time_parsing::{TimeParseError, TimeParser};

pub const PROMPT_WHAT: &str = "✍ Что напомнить?";
pub const PROMPT_WHEN: &str = "⏳ Через сколько напомнить?";
pub const PROMPT_CATEGORY: &str = "🏷️ Введите название категории:";
pub const PROMPT_BAD_TIME: &str =
    "⛔ Не понял время. Пример: 'через 5 мин', 'в 17:00' или 'завтра в 10 часов'.";
pub const PROMPT_EMPTY_NOTE: &str =
    "✍ Не вижу, о чём напомнить. Напиши задачу вместе со временем, например: через 5 мин позвонить маме.";
pub const WARN_PASSED: &str = "⚠️ Время уже прошло.";
pub const LIST_EMPTY: &str = "📋 Нет активных напоминаний";

/// Result of a button press, for the transport's interaction reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Acknowledged,
    Deleted,
    /// Unknown, already removed, or owned by another chat
    NotFound,
}

impl ActionOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ActionOutcome::Acknowledged => "✅ Выполнено",
            ActionOutcome::Deleted => "🗑️ Удалено",
            ActionOutcome::NotFound => "Напоминание уже удалено",
        }
    }
}

pub struct ReminderService {
    scheduler: ReminderScheduler,
    conversations: ConversationTracker,
    message_parser: TimeParser,
    reply_parser: TimeParser,
    classifier: CategoryClassifier,
    gateway: Arc<dyn DeliveryGateway>,
    /// One lock per chat; events of a chat are handled one at a time
    chat_turns: DashMap<ChatId, Arc<Mutex<()>>>,
}

impl ReminderService {
    pub fn new(
        gateway: Arc<dyn DeliveryGateway>,
        clock: Arc<dyn Clock>,
        classifier: CategoryClassifier,
    ) -> Result<Self> {
        Ok(Self {
            scheduler: ReminderScheduler::new(gateway.clone(), clock),
            conversations: ConversationTracker::new(),
            message_parser: TimeParser::for_message()?,
            reply_parser: TimeParser::for_reply()?,
            classifier,
            gateway,
            chat_turns: DashMap::new(),
        })
    }

    fn chat_turn(&self, chat_id: ChatId) -> Arc<Mutex<()>> {
        self.chat_turns.entry(chat_id).or_default().clone()
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn conversations(&self) -> &ConversationTracker {
        &self.conversations
    }

    /// Handle one inbound text message. Waits for any earlier event of the
    /// same chat to finish first.
    pub async fn on_inbound_text(&self, chat_id: ChatId, text: &str) {
        let turn = self.chat_turn(chat_id);
        let _turn = turn.lock().await;

        let command = Command::parse(text);
        debug!(
            "Inbound text in chat {chat_id} ({}): {command:?}",
            self.conversations.state(chat_id)
        );

        match command {
            Command::Start => {
                self.conversations.reset(chat_id);
                self.reply(chat_id, &welcome_text()).await;
            }
            Command::Help => self.reply(chat_id, &help_text()).await,
            Command::Remind => {
                self.conversations.reset(chat_id);
                self.reply(chat_id, PROMPT_WHAT).await;
            }
            Command::AddCategory => {
                self.conversations.await_category(chat_id);
                self.reply(chat_id, PROMPT_CATEGORY).await;
            }
            Command::List => self.show_list(chat_id).await,
            Command::RepeatOn => {
                self.conversations.set_repeat(chat_id, true);
                self.reply(chat_id, MENU_REPEAT_ON).await;
            }
            Command::RepeatOff => {
                self.conversations.set_repeat(chat_id, false);
                self.reply(chat_id, MENU_REPEAT_OFF).await;
            }
            Command::SetCategory(name) => self.link_category(chat_id, &name).await,
            Command::ClearCategory => {
                self.conversations.clear_sticky_category(chat_id);
                self.conversations.reset(chat_id);
                self.reply(chat_id, "🏷️ Категории снова определяются автоматически.")
                    .await;
            }
            Command::Text(text) if text.is_empty() => {}
            Command::Text(text) => match self.conversations.state(chat_id) {
                ConversationState::AwaitingCategoryName => self.link_category(chat_id, &text).await,
                ConversationState::AwaitingTime(note) => {
                    self.handle_time_reply(chat_id, &note, &text).await
                }
                ConversationState::Idle => self.handle_fresh_text(chat_id, &text).await,
            },
        }
    }

    /// Handle a button press on a delivered reminder or list
    pub async fn on_inbound_action(
        &self,
        chat_id: ChatId,
        reminder_id: &ReminderId,
        action: ReminderAction,
    ) -> ActionOutcome {
        let turn = self.chat_turn(chat_id);
        let _turn = turn.lock().await;

        if self.scheduler.owner_of(reminder_id).await != Some(chat_id) {
            debug!("Action {action} on {reminder_id} from chat {chat_id} ignored");
            return ActionOutcome::NotFound;
        }

        match action {
            ReminderAction::Acknowledge if self.scheduler.acknowledge(reminder_id).await => {
                ActionOutcome::Acknowledged
            }
            ReminderAction::Delete if self.scheduler.cancel(reminder_id).await => {
                ActionOutcome::Deleted
            }
            _ => ActionOutcome::NotFound,
        }
    }

    async fn handle_fresh_text(&self, chat_id: ChatId, text: &str) {
        let now = self.scheduler.now();
        match self.message_parser.parse(text, now) {
            Ok(parsed) if parsed.note.is_empty() => {
                self.reply(chat_id, PROMPT_EMPTY_NOTE).await;
            }
            Ok(parsed) => {
                self.create(chat_id, &parsed.note, parsed.fire_at).await;
            }
            Err(TimeParseError::AlreadyPassed { .. }) => {
                self.reply(chat_id, WARN_PASSED).await;
            }
            Err(TimeParseError::Unrecognized) => {
                self.conversations.await_time(chat_id, text);
                self.reply(chat_id, PROMPT_WHEN).await;
            }
        }
    }

    async fn handle_time_reply(&self, chat_id: ChatId, note: &str, text: &str) {
        let now = self.scheduler.now();
        match self.reply_parser.parse(text, now) {
            Ok(parsed) => {
                if self.create(chat_id, note, parsed.fire_at).await {
                    self.conversations.reset(chat_id);
                }
            }
            Err(TimeParseError::AlreadyPassed { .. }) => {
                self.reply(chat_id, WARN_PASSED).await;
            }
            Err(TimeParseError::Unrecognized) => {
                self.reply(chat_id, PROMPT_BAD_TIME).await;
            }
        }
    }

    /// Schedule a reminder and confirm it; `false` if it was rejected
    async fn create(&self, chat_id: ChatId, note: &str, fire_at: NaiveDateTime) -> bool {
        let category = self
            .conversations
            .sticky_category(chat_id)
            .unwrap_or_else(|| self.classifier.classify(note));

        let request = NewReminder {
            chat_id,
            note: note.to_string(),
            fire_at,
            category: category.clone(),
            repeat_enabled: self.conversations.repeat_enabled(chat_id),
        };

        match self.scheduler.schedule(request).await {
            Ok(_) => {
                self.reply(
                    chat_id,
                    &format!(
                        "✅ Запомнил! Напомню {} (Категория: {category})",
                        format_fire_at(&fire_at)
                    ),
                )
                .await;
                true
            }
            Err(ScheduleError::EmptyNote) => {
                self.reply(chat_id, PROMPT_EMPTY_NOTE).await;
                false
            }
            Err(ScheduleError::TimeAlreadyPassed { .. }) => {
                self.reply(chat_id, WARN_PASSED).await;
                false
            }
        }
    }

    async fn link_category(&self, chat_id: ChatId, name: &str) {
        self.conversations.reset(chat_id);
        let name = name.trim();
        if name.is_empty() {
            self.reply(chat_id, PROMPT_CATEGORY).await;
            self.conversations.await_category(chat_id);
            return;
        }

        self.conversations.set_sticky_category(chat_id, name);
        let relabeled = self.scheduler.recategorize_latest(chat_id, name).await;
        info!("Chat {chat_id} pinned category '{name}' (relabeled: {relabeled:?})");

        let text = if relabeled.is_some() {
            format!("🏷️ Категория '{name}' привязана к последнему напоминанию и будет использоваться для новых.")
        } else {
            format!("🏷️ Категория '{name}' будет использоваться для новых напоминаний.")
        };
        self.reply(chat_id, &text).await;
    }

    async fn show_list(&self, chat_id: ChatId) {
        let groups = self.scheduler.list(chat_id).await;
        if groups.is_empty() {
            self.reply(chat_id, LIST_EMPTY).await;
            return;
        }

        let controls = groups
            .iter()
            .flat_map(|group| &group.reminders)
            .take(MAX_CONTROLS)
            .map(|entry| Control::new(ReminderAction::Delete, entry.id.clone()))
            .collect();
        self.send(
            chat_id,
            OutboundMessage::with_controls(render_list(&groups), controls),
        )
        .await;
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        self.send(chat_id, OutboundMessage::text(text)).await;
    }

    async fn send(&self, chat_id: ChatId, message: OutboundMessage) {
        if let Err(e) = self.gateway.deliver(chat_id, message).await {
            warn!("Failed to reply in chat {chat_id}: {e}");
        }
    }
}

fn entry_status(entry: &ListEntry) -> String {
    if entry.completed {
        "выполнено".to_string()
    } else if entry.fired {
        "сработало".to_string()
    } else {
        format!("через {}", format_remaining(entry.remaining))
    }
}

/// Category headers followed by numbered reminders. The numbers match the
/// ordinals on the delete buttons; rows past [`MAX_CONTROLS`] get no button.
pub fn render_list(groups: &[CategoryGroup]) -> String {
    let mut text = String::new();
    let mut number = 0;
    for group in groups {
        text.push_str(&format!("🔖 **{}**:\n", group.category));
        for entry in &group.reminders {
            number += 1;
            let no_button = if number > MAX_CONTROLS {
                " (без кнопки)"
            } else {
                ""
            };
            text.push_str(&format!(
                "{number}. {} ({}, {}){no_button}\n",
                entry.note,
                format_fire_at(&entry.fire_at),
                entry_status(entry)
            ));
        }
        text.push('\n');
    }
    if number > MAX_CONTROLS {
        text.push_str(&format!(
            "Кнопки удаления есть только у первых {MAX_CONTROLS} напоминаний.\n"
        ));
    }
    text.trim_end().to_string()
}

pub fn welcome_text() -> String {
    format!(
        "👋 Напиши напоминание, потом укажи время (например: через 5 сек пойти гулять).\n\n\
         Меню:\n{MENU_REMIND}\n{MENU_ADD_CATEGORY}\n{MENU_LIST}\n{MENU_REPEAT_ON}\n{MENU_REPEAT_OFF}"
    )
}

pub fn help_text() -> String {
    format!(
        "📚 Напиши что напомнить - бот спросит через сколько.\n\
         Можно сразу: 'через 10 мин выпить воды', 'завтра в 9:00 купить молоко', '10 мая в 14:00 аптека'.\n\
         {MENU_REMIND} - диалог\n\
         {MENU_LIST} - напоминания\n\
         {MENU_ADD_CATEGORY} - своя категория (/category <название>, /category auto - сброс)\n\
         {MENU_REPEAT_ON} / {MENU_REPEAT_OFF} - повтор через минуту, пока не нажмёшь «Выполнено»"
    )
}
