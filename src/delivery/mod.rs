//! # Delivery Gateway
//!
//! Outbound side of the chat transport. The reminder core only knows this
//! trait; the Discord implementation lives in [`discord`].
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod discord;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::ChatId;
use crate::features::reminders::ReminderId;

pub use discord::DiscordGateway;

/// Actions a user can take on a delivered reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderAction {
    /// Mark as done, suppressing the follow-up
    Acknowledge,
    /// Remove the reminder and its timers
    Delete,
}

impl ReminderAction {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderAction::Acknowledge => "✅ Выполнено",
            ReminderAction::Delete => "❌ Удалить",
        }
    }
}

impl std::fmt::Display for ReminderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderAction::Acknowledge => write!(f, "acknowledge"),
            ReminderAction::Delete => write!(f, "delete"),
        }
    }
}

/// A button bound to one reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub action: ReminderAction,
    pub reminder_id: ReminderId,
}

impl Control {
    pub fn new(action: ReminderAction, reminder_id: ReminderId) -> Self {
        Self {
            action,
            reminder_id,
        }
    }
}

/// Most controls one message can carry
pub const MAX_CONTROLS: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub controls: Vec<Control>,
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            controls: Vec::new(),
        }
    }

    pub fn with_controls(text: impl Into<String>, controls: Vec<Control>) -> Self {
        Self {
            text: text.into(),
            controls,
        }
    }
}

/// Sends messages to a chat. Callers log failures and move on.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    async fn deliver(&self, chat_id: ChatId, message: OutboundMessage) -> Result<()>;
}

#[cfg(test)]
pub mod testing {
    //! Gateway double that records every outbound message.

    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingGateway {
        sent: Mutex<Vec<(ChatId, OutboundMessage)>>,
    }

    impl RecordingGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn sent(&self) -> Vec<(ChatId, OutboundMessage)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn texts_for(&self, chat_id: ChatId) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter(|(chat, _)| *chat == chat_id)
                .map(|(_, message)| message.text)
                .collect()
        }

        pub fn last(&self) -> Option<(ChatId, OutboundMessage)> {
            self.sent().last().cloned()
        }

        pub fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl DeliveryGateway for RecordingGateway {
        async fn deliver(&self, chat_id: ChatId, message: OutboundMessage) -> Result<()> {
            // Suspend like a network call would, so callers interleave
            tokio::task::yield_now().await;
            self.sent.lock().unwrap().push((chat_id, message));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn DeliveryGateway) {}

    #[test]
    fn test_action_labels() {
        assert_eq!(ReminderAction::Acknowledge.label(), "✅ Выполнено");
        assert_eq!(ReminderAction::Delete.to_string(), "delete");
    }

    #[tokio::test]
    async fn test_recording_gateway() {
        let gateway = testing::RecordingGateway::new();
        gateway.deliver(1, OutboundMessage::text("hi")).await.unwrap();
        gateway.deliver(2, OutboundMessage::text("other")).await.unwrap();
        assert_eq!(gateway.texts_for(1), vec!["hi"]);
        assert_eq!(gateway.sent().len(), 2);
    }
}
