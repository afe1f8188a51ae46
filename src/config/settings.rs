//! Settings loading from config.toml
//!
//! All fields carry defaults, so a missing or partial file is fine. The path can be
//! overridden with `LEDGER_PULSE_CONFIG`; the database itself is selected with
//! `DATABASE_URL` (see [`crate::config::database`]).

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};

const CONFIG_PATH_VAR: &str = "LEDGER_PULSE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Longest accepted reminder sweep interval, one week
pub const MAX_REMINDER_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Fallback tracing filter when `RUST_LOG` is not set
    pub log_filter: String,
    /// Background trigger configuration
    pub scheduler: SchedulerSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

/// Which background triggers run, and how often reminders are swept
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Materialize recurring transactions daily at midnight UTC
    pub recurring_enabled: bool,
    /// Bill subscriptions daily at midnight UTC
    pub subscriptions_enabled: bool,
    /// Process due reminders periodically
    pub reminders_enabled: bool,
    /// Minutes between reminder sweeps
    pub reminder_interval_minutes: u64,
}

impl SchedulerSettings {
    /// Time between reminder sweeps.
    ///
    /// # Errors
    /// `Config` if the interval is zero or longer than [`MAX_REMINDER_INTERVAL_MINUTES`].
    pub fn reminder_period(&self) -> Result<Duration> {
        match self.reminder_interval_minutes {
            0 => Err(Error::Config {
                message: "scheduler.reminder_interval_minutes must be greater than zero".to_string(),
            }),
            minutes if minutes > MAX_REMINDER_INTERVAL_MINUTES => Err(Error::Config {
                message: format!(
                    "scheduler.reminder_interval_minutes must be at most {MAX_REMINDER_INTERVAL_MINUTES}, got {minutes}"
                ),
            }),
            minutes => Ok(Duration::from_secs(minutes * 60)),
        }
    }
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            recurring_enabled: true,
            subscriptions_enabled: true,
            reminders_enabled: true,
            reminder_interval_minutes: 60,
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The reminder interval is zero or longer than a week
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses and validates settings from TOML text.
pub fn parse_config(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    settings.scheduler.reminder_period()?;

    Ok(settings)
}

/// Loads settings from `LEDGER_PULSE_CONFIG` or `./config.toml`.
///
/// A missing file is not an error: defaults are returned and a debug line is logged.
pub fn load_default_config() -> Result<Settings> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    if !Path::new(&path).exists() {
        tracing::debug!("No config file at {path}, using defaults");
        return Ok(Settings::default());
    }

    load_config(path)
}
