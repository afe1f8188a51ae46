//! Transaction entity - One immutable ledger entry.
//!
//! Entries carry a `direction` instead of a signed amount; `amount` is always positive.
//! Generated entries keep a back-reference to the recurring definition or subscription
//! that produced them (`recurring_transaction_id` / `subscription_id`).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which way money moves relative to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money coming in, increases the balance
    #[sea_orm(string_value = "income")]
    Income,
    /// Money going out, decreases the balance and consumes budget
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl Direction {
    /// Signed balance delta for an entry of `amount` in this direction.
    #[must_use]
    pub fn signed(self, amount: f64) -> f64 {
        match self {
            Self::Income => amount,
            Self::Expense => -amount,
        }
    }
}

/// Ledger entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the entry
    pub user_id: String,
    /// Account the entry is posted against
    pub account_id: i64,
    /// Income or expense
    pub direction: Direction,
    /// Positive amount
    pub amount: f64,
    /// Category label (e.g., "Rent", "Salary", "Subscriptions")
    pub category: String,
    /// Human-readable description
    pub description: String,
    /// Calendar day the entry belongs to
    pub transaction_date: Date,
    /// When the row was written
    pub created_at: DateTimeUtc,
    /// Recurring definition that generated this entry, if any
    pub recurring_transaction_id: Option<i64>,
    /// Subscription that generated this entry, if any
    pub subscription_id: Option<i64>,
}

impl Model {
    /// Whether the entry was produced by the recurrence engine.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.recurring_transaction_id.is_some() || self.subscription_id.is_some()
    }
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
