//! Discord implementation of [`DeliveryGateway`].
//!
//! Reminder buttons are encoded into component custom ids so a click can be
//! routed back to the reminder without any extra state.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serenity::builder::CreateComponents;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::id::ChannelId;
use std::sync::Arc;

use super::{Control, DeliveryGateway, OutboundMessage, ReminderAction, MAX_CONTROLS};
use crate::core::{chunk_for_message, ChatId};
use crate::features::reminders::ReminderId;

/// Button ID prefixes for routing
pub const ACK_PREFIX: &str = "remind_ack:";
pub const DELETE_PREFIX: &str = "remind_del:";

// Discord limits: 5 buttons per row, 5 rows total
const BUTTONS_PER_ROW: usize = 5;
const MAX_ROWS: usize = MAX_CONTROLS / BUTTONS_PER_ROW;

pub fn control_custom_id(control: &Control) -> String {
    let prefix = match control.action {
        ReminderAction::Acknowledge => ACK_PREFIX,
        ReminderAction::Delete => DELETE_PREFIX,
    };
    format!("{prefix}{}", control.reminder_id)
}

/// Parse a reminder button custom_id
///
/// Returns (action, reminder_id) if valid
pub fn parse_control_id(custom_id: &str) -> Option<(ReminderAction, ReminderId)> {
    let (action, id) = if let Some(id) = custom_id.strip_prefix(ACK_PREFIX) {
        (ReminderAction::Acknowledge, id)
    } else {
        (ReminderAction::Delete, custom_id.strip_prefix(DELETE_PREFIX)?)
    };

    if id.is_empty() {
        return None;
    }
    Some((action, ReminderId::from(id)))
}

/// Button captions; repeated actions get an ordinal so list rows stay distinguishable
fn button_labels(controls: &[Control]) -> Vec<String> {
    controls
        .iter()
        .map(|control| {
            let same: Vec<_> = controls
                .iter()
                .filter(|c| c.action == control.action)
                .collect();
            if same.len() > 1 {
                let ordinal = same
                    .iter()
                    .position(|c| std::ptr::eq(*c, control))
                    .map_or(0, |p| p + 1);
                format!("{} {ordinal}", control.action.label())
            } else {
                control.action.label().to_string()
            }
        })
        .collect()
}

pub fn create_control_buttons(controls: &[Control]) -> CreateComponents {
    let mut components = CreateComponents::default();

    let limit = BUTTONS_PER_ROW * MAX_ROWS;
    if controls.len() > limit {
        warn!(
            "Dropping {} reminder buttons over the Discord limit of {limit}",
            controls.len() - limit
        );
    }

    let shown = &controls[..controls.len().min(limit)];
    let labels = button_labels(shown);
    let buttons: Vec<_> = shown.iter().zip(labels).collect();

    for row_buttons in buttons.chunks(BUTTONS_PER_ROW) {
        components.create_action_row(|row| {
            for (control, label) in row_buttons {
                let style = match control.action {
                    ReminderAction::Acknowledge => ButtonStyle::Success,
                    ReminderAction::Delete => ButtonStyle::Danger,
                };
                row.create_button(|btn| {
                    btn.custom_id(control_custom_id(control))
                        .label(label)
                        .style(style)
                });
            }
            row
        });
    }

    components
}

pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DeliveryGateway for DiscordGateway {
    async fn deliver(&self, chat_id: ChatId, message: OutboundMessage) -> Result<()> {
        let channel = ChannelId(
            u64::try_from(chat_id).with_context(|| format!("Invalid channel id {chat_id}"))?,
        );

        let chunks = chunk_for_message(&message.text);
        let last = chunks.len().saturating_sub(1);
        for (i, chunk) in chunks.iter().enumerate() {
            let components = (i == last && !message.controls.is_empty())
                .then(|| create_control_buttons(&message.controls));

            channel
                .send_message(&self.http, |m| {
                    m.content(chunk);
                    if let Some(components) = components {
                        m.set_components(components);
                    }
                    m
                })
                .await
                .with_context(|| format!("Failed to send message to channel {chat_id}"))?;
        }

        debug!(
            "Delivered {} chunk(s) with {} control(s) to {chat_id}",
            chunks.len(),
            message.controls.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_id_roundtrip() {
        let control = Control::new(ReminderAction::Acknowledge, ReminderId::from("42_1700000000"));
        let custom_id = control_custom_id(&control);
        assert_eq!(custom_id, "remind_ack:42_1700000000");
        assert_eq!(
            parse_control_id(&custom_id),
            Some((ReminderAction::Acknowledge, ReminderId::from("42_1700000000")))
        );

        let delete = Control::new(ReminderAction::Delete, ReminderId::from("7_1"));
        assert_eq!(
            parse_control_id(&control_custom_id(&delete)),
            Some((ReminderAction::Delete, ReminderId::from("7_1")))
        );
    }

    #[test]
    fn test_parse_rejects_foreign_ids() {
        assert_eq!(parse_control_id("continue_council_123"), None);
        assert_eq!(parse_control_id("remind_ack:"), None);
        assert_eq!(parse_control_id(""), None);
    }

    #[test]
    fn test_repeated_actions_are_numbered() {
        let controls = vec![
            Control::new(ReminderAction::Delete, ReminderId::from("1_1")),
            Control::new(ReminderAction::Delete, ReminderId::from("1_2")),
        ];
        assert_eq!(button_labels(&controls), vec!["❌ Удалить 1", "❌ Удалить 2"]);

        let fired = vec![
            Control::new(ReminderAction::Acknowledge, ReminderId::from("1_1")),
            Control::new(ReminderAction::Delete, ReminderId::from("1_1")),
        ];
        assert_eq!(button_labels(&fired), vec!["✅ Выполнено", "❌ Удалить"]);
    }
}
