//! Per-chat conversation state machine and sticky settings.

use dashmap::DashMap;

use crate::core::ChatId;

/// Where a chat currently is in the dialogue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConversationState {
    #[default]
    Idle,
    /// A note was given, the next message should carry the time
    AwaitingTime(String),
    /// The next message is a category name
    AwaitingCategoryName,
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationState::Idle => write!(f, "idle"),
            ConversationState::AwaitingTime(_) => write!(f, "awaiting_time"),
            ConversationState::AwaitingCategoryName => write!(f, "awaiting_category_name"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    pub state: ConversationState,
    /// Sticky repeat toggle, captured into each new reminder
    pub repeat: bool,
    /// Overrides the classifier while set
    pub sticky_category: Option<String>,
}

/// Thread-safe map of chat sessions
#[derive(Debug, Default)]
pub struct ConversationTracker {
    sessions: DashMap<ChatId, ChatSession>,
}

impl ConversationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self, chat_id: ChatId) -> ChatSession {
        self.sessions
            .get(&chat_id)
            .map(|session| session.clone())
            .unwrap_or_default()
    }

    pub fn state(&self, chat_id: ChatId) -> ConversationState {
        self.sessions
            .get(&chat_id)
            .map(|session| session.state.clone())
            .unwrap_or_default()
    }

    pub fn await_time(&self, chat_id: ChatId, note: &str) {
        self.sessions.entry(chat_id).or_default().state =
            ConversationState::AwaitingTime(note.to_string());
    }

    pub fn await_category(&self, chat_id: ChatId) {
        self.sessions.entry(chat_id).or_default().state = ConversationState::AwaitingCategoryName;
    }

    pub fn reset(&self, chat_id: ChatId) {
        if let Some(mut session) = self.sessions.get_mut(&chat_id) {
            session.state = ConversationState::Idle;
        }
    }

    pub fn set_repeat(&self, chat_id: ChatId, enabled: bool) {
        self.sessions.entry(chat_id).or_default().repeat = enabled;
    }

    pub fn repeat_enabled(&self, chat_id: ChatId) -> bool {
        self.sessions
            .get(&chat_id)
            .map(|session| session.repeat)
            .unwrap_or(false)
    }

    pub fn set_sticky_category(&self, chat_id: ChatId, category: &str) {
        self.sessions.entry(chat_id).or_default().sticky_category = Some(category.to_string());
    }

    pub fn clear_sticky_category(&self, chat_id: ChatId) {
        if let Some(mut session) = self.sessions.get_mut(&chat_id) {
            session.sticky_category = None;
        }
    }

    pub fn sticky_category(&self, chat_id: ChatId) -> Option<String> {
        self.sessions
            .get(&chat_id)
            .and_then(|session| session.sticky_category.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_idle() {
        let tracker = ConversationTracker::new();
        assert_eq!(tracker.state(1), ConversationState::Idle);
        assert!(!tracker.repeat_enabled(1));
        assert_eq!(tracker.sticky_category(1), None);
    }

    #[test]
    fn test_awaiting_time_keeps_note() {
        let tracker = ConversationTracker::new();
        tracker.await_time(1, "купить молоко");
        assert_eq!(
            tracker.state(1),
            ConversationState::AwaitingTime("купить молоко".to_string())
        );
        tracker.reset(1);
        assert_eq!(tracker.state(1), ConversationState::Idle);
    }

    #[test]
    fn test_repeat_flag_survives_state_changes() {
        let tracker = ConversationTracker::new();
        tracker.set_repeat(1, true);
        tracker.await_category(1);
        assert!(tracker.repeat_enabled(1));
        assert_eq!(tracker.state(1), ConversationState::AwaitingCategoryName);
        tracker.reset(1);
        assert!(tracker.repeat_enabled(1));
    }

    #[test]
    fn test_chats_are_independent() {
        let tracker = ConversationTracker::new();
        tracker.await_time(1, "note");
        tracker.set_sticky_category(2, "Работа");

        assert_eq!(tracker.state(2), ConversationState::Idle);
        assert_eq!(tracker.sticky_category(1), None);
        assert_eq!(tracker.sticky_category(2), Some("Работа".to_string()));

        tracker.clear_sticky_category(2);
        assert_eq!(tracker.session(2).sticky_category, None);
    }
}
