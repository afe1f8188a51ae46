//! Goal entity - A savings target such as "Holiday Trip" or "Emergency Fund".

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Still collecting contributions
    #[sea_orm(string_value = "active")]
    Active,
    /// Target reached
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Temporarily on hold
    #[sea_orm(string_value = "paused")]
    Paused,
    /// Abandoned
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Goal database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    /// Unique identifier for the goal
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the goal
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Amount to reach
    pub target_amount: f64,
    /// Amount saved so far
    pub current_amount: f64,
    /// Deadline, if the goal has one
    pub target_date: Option<Date>,
    /// Lifecycle state
    pub status: GoalStatus,
    /// When the goal was created
    pub created_at: DateTimeUtc,
    /// Last contribution or status change
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Progress towards the target as a percentage, rounded to two decimals.
    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        crate::core::percentage_of(self.current_amount, self.target_amount)
    }
}

/// `Goal` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
