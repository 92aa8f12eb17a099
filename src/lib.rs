// Core layer - shared types and configuration
pub mod core;

// Features layer - parsing, classification, dialogue and scheduling
pub mod features;

// Outbound transport
pub mod delivery;

// Application layer
pub mod commands;

pub use core::Config;

pub use commands::ReminderService;
pub use delivery::{DeliveryGateway, DiscordGateway};
pub use features::{CategoryClassifier, ReminderScheduler, TimeParser};
