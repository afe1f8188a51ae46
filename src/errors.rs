//! Unified error types for the ledger engine.
//!
//! Store failures, configuration problems and invalid inputs all surface through
//! the single [`Error`] enum so callers can propagate with `?` everywhere.

use chrono::NaiveDate;
use thiserror::Error;

/// All failures the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The store rejected a query or the unit of work aborted
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Settings file or environment could not be used
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Amount is zero, negative where not allowed, or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Month/year pair does not name a calendar month
    #[error("Invalid period: {month}/{year}")]
    InvalidPeriod {
        /// Requested month (1-12 expected)
        month: u32,
        /// Requested year
        year: i32,
    },

    /// A trend asked for more months than [`crate::core::analytics::MAX_TREND_MONTHS`]
    #[error("Trend lookback of {months} months exceeds the limit of {max}")]
    LookbackTooLong {
        /// Requested number of months
        months: u32,
        /// Largest accepted number of months
        max: u32,
    },

    /// A ledger write referenced an account that does not exist
    #[error("Account not found: {id}")]
    AccountNotFound {
        /// Missing account id
        id: i64,
    },

    /// Advancing a schedule ran past the representable calendar
    #[error("Date overflow advancing schedule from {date}")]
    DateOverflow {
        /// Date the advance started from
        date: NaiveDate,
    },

    /// JSON payload could not be produced
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
