//! Shared test utilities for the ledger engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        budget,
        definitions::{self, NewRecurringTransaction, NewSubscription},
        goal,
        ledger::{self, NewTransaction},
        schedule::Frequency,
    },
    entities::{Direction, account, budget as budget_entity, goal as goal_entity, recurring_transaction, subscription, transaction},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date. Panics on an invalid date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Shorthand for a whole-minute UTC instant. Panics on an invalid instant.
#[allow(clippy::unwrap_used)]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// Creates a test account named "Checking" with the given opening balance.
pub async fn create_test_account(
    db: &DatabaseConnection,
    user_id: &str,
    balance: f64,
) -> Result<account::Model> {
    ledger::create_account(db, user_id, "Checking", balance).await
}

/// Creates a budget for one category and month, named after the category.
pub async fn create_test_budget(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    month: u32,
    year: i32,
    amount: f64,
) -> Result<budget_entity::Model> {
    budget::upsert_budget(db, user_id, category, category, month, year, amount).await
}

/// Records a manual ledger entry. Balance and budget move with it.
pub async fn create_test_entry(
    db: &DatabaseConnection,
    user_id: &str,
    account_id: i64,
    direction: Direction,
    amount: f64,
    category: &str,
    date: NaiveDate,
) -> Result<transaction::Model> {
    ledger::record_transaction(
        db,
        user_id,
        NewTransaction {
            account_id,
            direction,
            amount,
            category: category.to_string(),
            description: format!("Test {category}"),
            date,
        },
    )
    .await
}

/// Creates a recurring definition named "Test Recurring".
///
/// # Defaults
/// * `category`: "Test"
#[allow(clippy::too_many_arguments)]
pub async fn create_test_recurring(
    db: &DatabaseConnection,
    user_id: &str,
    account_id: i64,
    direction: Direction,
    amount: f64,
    frequency: Frequency,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<recurring_transaction::Model> {
    definitions::create_recurring_transaction(
        db,
        user_id,
        NewRecurringTransaction {
            account_id,
            name: "Test Recurring".to_string(),
            direction,
            amount,
            category: "Test".to_string(),
            frequency,
            start_date,
            end_date,
        },
    )
    .await
}

/// Creates an open-ended monthly recurring expense in `category`.
pub async fn create_test_recurring_in(
    db: &DatabaseConnection,
    user_id: &str,
    account_id: i64,
    category: &str,
    amount: f64,
    start_date: NaiveDate,
) -> Result<recurring_transaction::Model> {
    definitions::create_recurring_transaction(
        db,
        user_id,
        NewRecurringTransaction {
            account_id,
            name: "Test Recurring".to_string(),
            direction: Direction::Expense,
            amount,
            category: category.to_string(),
            frequency: Frequency::Monthly,
            start_date,
            end_date: None,
        },
    )
    .await
}

/// Creates an active subscription.
pub async fn create_test_subscription(
    db: &DatabaseConnection,
    user_id: &str,
    account_id: i64,
    service_name: &str,
    amount: f64,
    billing_cycle: Frequency,
    next_billing_date: NaiveDate,
) -> Result<subscription::Model> {
    definitions::create_subscription(
        db,
        user_id,
        NewSubscription {
            account_id,
            service_name: service_name.to_string(),
            amount,
            billing_cycle,
            next_billing_date,
            notes: None,
        },
    )
    .await
}

/// Creates an active goal with nothing saved yet.
pub async fn create_test_goal(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    target_amount: f64,
    target_date: Option<NaiveDate>,
) -> Result<goal_entity::Model> {
    goal::create_goal(db, user_id, name, target_amount, target_date).await
}
