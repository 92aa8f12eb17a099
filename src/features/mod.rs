// Feature modules, ordered bottom-up: parsing and classification feed the
// conversation, which feeds the scheduler.
pub mod categories;
pub mod conversation;
pub mod reminders;
pub mod time_parsing;

pub use categories::{CategoryClassifier, CategoryConfig};
pub use conversation::{ConversationState, ConversationTracker};
pub use reminders::{Reminder, ReminderId, ReminderScheduler};
pub use time_parsing::{ParsedTime, TimeParseError, TimeParser};
