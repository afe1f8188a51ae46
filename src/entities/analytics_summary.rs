//! Analytics summary entity - The cached, compact part of a monthly analytics report.
//!
//! At most one row per (`user_id`, `month`, `year`). `generated_at` decides freshness.
//! Only the aggregates live here; budget and goal snapshots are always computed live.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cached monthly summary model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analytics_summaries")]
pub struct Model {
    /// Unique identifier for the summary
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner the summary was computed for
    pub user_id: String,
    /// Calendar month, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Sum of income entries
    pub total_income: f64,
    /// Income that came from recurring definitions
    pub recurring_income: f64,
    /// Sum of expense entries
    pub total_expenses: f64,
    /// Expenses that came from recurring definitions or subscriptions
    pub recurring_expenses: f64,
    /// JSON object mapping category to expense total
    pub expenses_by_category_json: Option<String>,
    /// Income minus expenses
    pub net_savings: f64,
    /// Net savings as a percentage of income (0 without income)
    pub savings_rate: f64,
    /// Expenses divided by the days in the month
    pub average_daily_spending: f64,
    /// When this row was last recomputed
    pub generated_at: DateTimeUtc,
}

/// `AnalyticsSummary` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
