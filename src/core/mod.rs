//! Core business logic - framework-agnostic recurrence, reminder and analytics engines.
//!
//! Every function takes a `SeaORM` connection and returns [`crate::errors::Result`].
//! Operations that depend on "now" come in pairs: a wrapper that reads the UTC clock
//! and an `*_at` variant taking the reference instant explicitly.

/// Monthly analytics with a read-through cache
pub mod analytics;
/// Budget periods and their consumption
pub mod budget;
/// Recurring transaction and subscription definitions
pub mod definitions;
/// Savings goals
pub mod goal;
/// Ledger writes: accounts, entries and the atomic materialize event
pub mod ledger;
/// Recurring transaction and subscription materialization
pub mod recurrence;
/// Due reminders, recurrence chaining and synthesis
pub mod reminder;
/// Frequency tags and period advancement
pub mod schedule;
/// Last-run bookkeeping for the background triggers
pub mod state;

/// `part` as a percentage of `whole`, rounded to two decimals; 0 when `whole` is not positive.
#[must_use]
pub fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    round2(part / whole * 100.0)
}

/// Rounds to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
