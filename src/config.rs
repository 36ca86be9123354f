//! Configuration loading and management.
//!
//! Configuration is loaded with the following precedence:
//! 1. Environment variables (`HISTKEEP_*`)
//! 2. Config file (`~/.histkeep/config.toml`)
//! 3. Defaults

use crate::error::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,

    /// History configuration.
    pub history: HistoryConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Cleanup configuration.
    pub cleanup: CleanupConfig,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the histkeep home directory.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_histkeep_home(),
        }
    }
}

/// History configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Records kept per session before the oldest are evicted.
    pub max_length: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_length: 10 }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `warn` or `histkeep=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Cleanup configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Default age for `clean`, in days.
    pub retention_days: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self { retention_days: 7 }
    }
}

/// Get the default histkeep home directory.
fn default_histkeep_home() -> PathBuf {
    dirs::home_dir().map_or_else(|| PathBuf::from(".histkeep"), |h| h.join(".histkeep"))
}

/// Load configuration with precedence: env vars → file → defaults.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    let config_path = get_config_path();
    if config_path.exists() {
        let contents = fs::read_to_string(&config_path).map_err(Error::Storage)?;
        config = parse_config(&contents)?;
    }

    apply_env_overrides(&mut config, |key| env::var(key).ok());

    Ok(config)
}

/// Parse a TOML config document.
///
/// # Errors
///
/// Returns [`Error::Config`] if the document is not valid.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
}

/// Get the path to the config file.
fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("HISTKEEP_CONFIG") {
        return PathBuf::from(path);
    }

    if let Ok(home) = env::var("HISTKEEP_HOME") {
        return PathBuf::from(home).join("config.toml");
    }

    default_histkeep_home().join("config.toml")
}

/// Apply environment variable overrides to config.
///
/// `lookup` resolves a variable name; unparsable numbers are ignored.
fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(path) = lookup("HISTKEEP_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    } else if let Some(home) = lookup("HISTKEEP_HOME") {
        config.storage.path = PathBuf::from(home);
    }

    if let Some(max) = lookup("HISTKEEP_MAX_LENGTH").and_then(|v| v.parse().ok()) {
        config.history.max_length = max;
    }

    if let Some(level) = lookup("HISTKEEP_LOG") {
        config.logging.level = level;
    }

    if let Some(days) = lookup("HISTKEEP_RETENTION_DAYS").and_then(|v| v.parse().ok()) {
        config.cleanup.retention_days = days;
    }
}
