//! # Feature: Conversation State
//!
//! Tracks, per chat, whether the bot is waiting for a time reply or a
//! category name, plus the sticky repeat and category settings.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod state;

pub use state::{ChatSession, ConversationState, ConversationTracker};
