//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use anyhow::{Context, Result};
use std::env;

/// Default path of the optional category table override
pub const DEFAULT_CATEGORIES_PATH: &str = "categories.yaml";

#[derive(Debug, Clone)]
pub struct Config {
    /// Bot token for the Discord transport
    pub discord_token: String,
    /// env_logger filter used when RUST_LOG is not set
    pub log_level: String,
    /// YAML file replacing the built-in category table, if it exists
    pub categories_config_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN").context("DISCORD_TOKEN must be set")?;

        if discord_token.trim().is_empty() {
            anyhow::bail!("DISCORD_TOKEN is empty");
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let categories_config_path = env::var("CATEGORIES_CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_CATEGORIES_PATH.to_string());

        Ok(Config {
            discord_token,
            log_level,
            categories_config_path,
        })
    }
}
