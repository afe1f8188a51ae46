//! Recurring transaction entity - A definition that materializes into ledger entries.
//!
//! `frequency` is stored as a free-form tag (`daily`, `weekly`, `monthly`, `quarterly`,
//! `yearly`) and interpreted by [`crate::core::schedule`], which falls back to monthly
//! for anything it does not recognise.

use super::transaction::Direction;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recurring transaction definition model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recurring_transactions")]
pub struct Model {
    /// Unique identifier for the definition
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the definition
    pub user_id: String,
    /// Account every generated entry is posted against
    pub account_id: i64,
    /// Label used for generated descriptions (e.g., "Monthly Rent")
    pub name: String,
    /// Income or expense
    pub direction: Direction,
    /// Positive amount copied onto every generated entry
    pub amount: f64,
    /// Category copied onto every generated entry
    pub category: String,
    /// Frequency tag
    pub frequency: String,
    /// First scheduled day
    pub start_date: Date,
    /// Last day an occurrence may fall on
    pub end_date: Option<Date>,
    /// Next due day; `None` means nothing further is scheduled
    pub next_occurrence: Option<Date>,
    /// Inactive definitions are never materialized
    pub is_active: bool,
    /// When the definition was created
    pub created_at: DateTimeUtc,
}

/// `RecurringTransaction` stores `account_id` without a foreign key; the engine checks the account
/// when it posts an entry.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
