//! Budget entity - Allotted spend for one category in one calendar month.
//!
//! Unique per (`user_id`, `category`, `month`, `year`); the index is created in
//! [`crate::config::database::create_tables`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Budget period database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    /// Unique identifier for the budget
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the budget
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Category matched against expense entries
    pub category: String,
    /// Allotted amount for the month
    pub amount: f64,
    /// Accumulated expenses for the month
    pub spent_amount: f64,
    /// Calendar month, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// When the budget was created
    pub created_at: DateTimeUtc,
    /// Last time the allotment or consumption changed
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Allotment left over; negative once overspent.
    #[must_use]
    pub fn remaining_amount(&self) -> f64 {
        self.amount - self.spent_amount
    }

    /// Consumption as a percentage of the allotment, rounded to two decimals.
    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        crate::core::percentage_of(self.spent_amount, self.amount)
    }
}

/// `Budget` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
