//! Database configuration module for the ledger engine.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. Composite unique keys, which the entity
//! derive cannot express, are added afterwards as explicit indexes; the upserts for
//! budgets and analytics summaries rely on them.

use crate::entities::{
    Account, AnalyticsSummary, AnalyticsSummaryColumn, Budget, BudgetColumn, Goal,
    RecurringTransaction, Reminder, Subscription, SystemState, Transaction,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/ledger_pulse.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let url = get_database_url();
    ensure_sqlite_dir(&url)?;
    Database::connect(&url).await.map_err(Into::into)
}

/// Creates the parent directory of a file-backed `SQLite` URL so `mode=rwc` can create the file.
fn ensure_sqlite_dir(url: &str) -> Result<()> {
    let Some(rest) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = rest.split('?').next().unwrap_or(rest);

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Creates every table plus the composite unique indexes.
///
/// Statements use `IF NOT EXISTS`, so running this against an existing database is a no-op.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Account).await?;
    create_table(db, &schema, Transaction).await?;
    create_table(db, &schema, RecurringTransaction).await?;
    create_table(db, &schema, Subscription).await?;
    create_table(db, &schema, Budget).await?;
    create_table(db, &schema, Goal).await?;
    create_table(db, &schema, Reminder).await?;
    create_table(db, &schema, AnalyticsSummary).await?;
    create_table(db, &schema, SystemState).await?;

    db.execute(builder.build(&budget_period_index())).await?;
    db.execute(builder.build(&analytics_period_index())).await?;

    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// One budget per owner, category and calendar month
fn budget_period_index() -> IndexCreateStatement {
    Index::create()
        .name("idx_budgets_owner_category_period")
        .table(Budget)
        .col(BudgetColumn::UserId)
        .col(BudgetColumn::Category)
        .col(BudgetColumn::Month)
        .col(BudgetColumn::Year)
        .unique()
        .if_not_exists()
        .to_owned()
}

/// One cached summary per owner and calendar month
fn analytics_period_index() -> IndexCreateStatement {
    Index::create()
        .name("idx_analytics_owner_period")
        .table(AnalyticsSummary)
        .col(AnalyticsSummaryColumn::UserId)
        .col(AnalyticsSummaryColumn::Month)
        .col(AnalyticsSummaryColumn::Year)
        .unique()
        .if_not_exists()
        .to_owned()
}
