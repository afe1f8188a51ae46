//! Account entity - A place money lives (checking, savings, mobile money, ...).
//!
//! The balance is the signed sum of every ledger entry posted against the account.
//! It is only ever changed together with the entry that explains the change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the account
    pub user_id: String,
    /// Display name (e.g., "M-Pesa", "Sacco Savings")
    pub name: String,
    /// Current balance, may go negative
    pub balance: f64,
    /// Closed accounts stay for history but receive no new entries from users
    pub is_active: bool,
    /// When the account was opened in the system
    pub created_at: DateTimeUtc,
    /// Last balance change
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account has many ledger entries
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
