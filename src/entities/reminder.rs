//! Reminder entity - A dated nudge shown to the user.
//!
//! Recurring reminders are never moved in place: once sent, the record is closed and a
//! fresh successor row carries the next date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// What the reminder is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// A bill falls due
    #[sea_orm(string_value = "bill_due")]
    BillDue,
    /// A subscription is about to renew
    #[sea_orm(string_value = "subscription_renewal")]
    SubscriptionRenewal,
    /// A goal deadline is approaching
    #[sea_orm(string_value = "goal_deadline")]
    GoalDeadline,
    /// A budget is close to its limit
    #[sea_orm(string_value = "budget_limit")]
    BudgetLimit,
    /// Anything the user typed in
    #[sea_orm(string_value = "custom")]
    Custom,
}

/// Reminder database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reminders")]
pub struct Model {
    /// Unique identifier for the reminder
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the reminder
    pub user_id: String,
    /// Short headline
    pub title: String,
    /// Longer text
    pub description: String,
    /// Kind of reminder
    pub kind: ReminderKind,
    /// When the reminder becomes due
    pub reminder_date: DateTimeUtc,
    /// Whether a successor is created once this one is sent
    pub is_recurring: bool,
    /// Frequency tag used to date the successor
    pub frequency: Option<String>,
    /// Set once the reminder has been processed
    pub is_sent: bool,
    /// Inactive reminders are ignored everywhere
    pub is_active: bool,
    /// Id of the subscription, goal or budget this reminder points at
    pub related_entity_id: Option<i64>,
    /// `"subscription"`, `"goal"` or `"budget"`
    pub related_entity_type: Option<String>,
    /// When the row was written
    pub created_at: DateTimeUtc,
}

/// `Reminder` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
