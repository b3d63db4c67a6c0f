//! Configuration management for database and application settings.
//!
//! Settings come from an optional `config.toml` next to the binary, with
//! environment variables taking precedence for deployment overrides. Every
//! field has a default good enough for local use.

/// Database connection management and schema creation
pub mod database;

use std::path::Path;

use serde::Deserialize;

use crate::errors::{Error, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/rcc_ledger.sqlite?mode=rwc";
const DEFAULT_NOTIFY_CAPACITY: usize = 64;

/// Application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Connection string for the relational store
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Per-subscriber buffer of the summary broadcast channel
    #[serde(default = "default_notify_capacity")]
    pub notify_capacity: usize,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

const fn default_notify_capacity() -> usize {
    DEFAULT_NOTIFY_CAPACITY
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            notify_capacity: default_notify_capacity(),
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the application configuration: `./config.toml` when present,
/// defaults otherwise, then environment overrides (`DATABASE_URL`).
///
/// # Errors
/// Returns [`Error::Config`] if a present `config.toml` is unreadable or
/// malformed; a missing file is not an error.
pub fn load_app_configuration() -> Result<AppConfig> {
    let mut config = if Path::new("config.toml").exists() {
        load_config("config.toml")?
    } else {
        AppConfig::default()
    };

    if let Ok(url) = std::env::var("DATABASE_URL") {
        config.database_url = url;
    }

    Ok(config)
}
