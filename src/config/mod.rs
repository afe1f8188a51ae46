/// Database configuration and connection management
pub mod database;

/// Settings loading from config.toml with environment overrides
pub mod settings;

pub use settings::{SchedulerSettings, Settings};
