//! # Core Module
//!
//! Shared types, configuration, clock and text helpers for the reminder bot.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Injectable clock for deterministic scheduling tests
//! - 1.0.0: Initial creation with config and format modules

pub mod clock;
pub mod config;
pub mod format;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use format::{chunk_for_message, chunk_text, format_fire_at, format_remaining, MESSAGE_LIMIT};

/// Identifier of the conversation a reminder belongs to
pub type ChatId = i64;
