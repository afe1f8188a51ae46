//! Subscription entity - A billed service (streaming, gym, cloud storage).
//!
//! Subscriptions always materialize as expenses and have no end date; they stop
//! only when cancelled.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Subscription database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    /// Unique identifier for the subscription
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owner of the subscription
    pub user_id: String,
    /// Account the charge is taken from
    pub account_id: i64,
    /// Service label (e.g., "Netflix")
    pub service_name: String,
    /// Charge per billing cycle
    pub amount: f64,
    /// Billing cycle tag (`weekly`, `monthly`, `quarterly`, `yearly`)
    pub billing_cycle: String,
    /// Next day the charge is due
    pub next_billing_date: Date,
    /// Day the user cancelled, if they did
    pub cancellation_date: Option<Date>,
    /// Inactive subscriptions are never billed
    pub is_active: bool,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the subscription was created
    pub created_at: DateTimeUtc,
}

/// `Subscription` stores `account_id` without a foreign key; the engine checks the account
/// when it posts an entry.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
