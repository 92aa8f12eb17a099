//! # Command System
//!
//! Text commands, menu captions and the per-chat dialogue that turns
//! inbound messages into scheduled reminders.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: `/category <name>` and `/category auto`
//! - 1.1.0: Repeat toggles
//! - 1.0.0: Initial command set

pub mod command;
pub mod service;

pub use command::{
    Command, MENU_ADD_CATEGORY, MENU_LIST, MENU_REMIND, MENU_REPEAT_OFF, MENU_REPEAT_ON,
};
pub use service::{render_list, ActionOutcome, ReminderService};
