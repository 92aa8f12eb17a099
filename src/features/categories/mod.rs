//! # Feature: Categories
//!
//! Assigns a label to each reminder note by matching word roots, so inflected
//! forms ("лекции", "лекцию") hit the same category. The table can be
//! replaced from YAML.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Household, finance and entertainment categories; YAML override
//! - 1.0.0: Work, study and health categories

pub mod classifier;
pub mod config;

pub use classifier::{CategoryClassifier, DEFAULT_LABEL};
pub use config::{CategoryConfig, CategoryRule};
