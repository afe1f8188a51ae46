//! Recurring transaction and subscription definitions.
//!
//! Definitions are created here by user action and afterwards only mutated by the
//! recurrence engine (schedule advancement and deactivation) or by cancellation.

use crate::{
    core::schedule::Frequency,
    entities::{
        Direction, RecurringTransaction, Subscription, recurring_transaction, subscription,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Input for [`create_recurring_transaction`]
#[derive(Debug, Clone)]
pub struct NewRecurringTransaction {
    /// Account every occurrence posts against
    pub account_id: i64,
    /// Label (e.g., "Monthly Rent")
    pub name: String,
    /// Income or expense
    pub direction: Direction,
    /// Positive amount per occurrence
    pub amount: f64,
    /// Category label
    pub category: String,
    /// How often it repeats
    pub frequency: Frequency,
    /// First occurrence
    pub start_date: NaiveDate,
    /// Optional last day an occurrence may fall on
    pub end_date: Option<NaiveDate>,
}

/// Input for [`create_subscription`]
#[derive(Debug, Clone)]
pub struct NewSubscription {
    /// Account charged
    pub account_id: i64,
    /// Service label (e.g., "Spotify")
    pub service_name: String,
    /// Charge per cycle
    pub amount: f64,
    /// Billing cycle
    pub billing_cycle: Frequency,
    /// First charge day
    pub next_billing_date: NaiveDate,
    /// Free-form notes
    pub notes: Option<String>,
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

/// Creates an active recurring definition whose first occurrence is `start_date`.
pub async fn create_recurring_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    new: NewRecurringTransaction,
) -> Result<recurring_transaction::Model> {
    validate_amount(new.amount)?;

    if new.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Recurring transaction name cannot be empty".to_string(),
        });
    }

    if new.end_date.is_some_and(|end| end < new.start_date) {
        return Err(Error::Config {
            message: "Recurring transaction ends before it starts".to_string(),
        });
    }

    let definition = recurring_transaction::ActiveModel {
        user_id: Set(user_id.to_string()),
        account_id: Set(new.account_id),
        name: Set(new.name.trim().to_string()),
        direction: Set(new.direction),
        amount: Set(new.amount),
        category: Set(new.category),
        frequency: Set(new.frequency.as_str().to_string()),
        start_date: Set(new.start_date),
        end_date: Set(new.end_date),
        next_occurrence: Set(Some(new.start_date)),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    definition.insert(db).await.map_err(Into::into)
}

/// Creates an active subscription.
pub async fn create_subscription(
    db: &DatabaseConnection,
    user_id: &str,
    new: NewSubscription,
) -> Result<subscription::Model> {
    validate_amount(new.amount)?;

    if new.service_name.trim().is_empty() {
        return Err(Error::Config {
            message: "Subscription service name cannot be empty".to_string(),
        });
    }

    let subscription = subscription::ActiveModel {
        user_id: Set(user_id.to_string()),
        account_id: Set(new.account_id),
        service_name: Set(new.service_name.trim().to_string()),
        amount: Set(new.amount),
        billing_cycle: Set(new.billing_cycle.as_str().to_string()),
        next_billing_date: Set(new.next_billing_date),
        cancellation_date: Set(None),
        is_active: Set(true),
        notes: Set(new.notes),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    subscription.insert(db).await.map_err(Into::into)
}

/// Cancels a subscription: it stops billing and records the cancellation day.
///
/// # Returns
/// * `Ok(Some(subscription))` - The cancelled subscription
/// * `Ok(None)` - No subscription with that id
pub async fn cancel_subscription(
    db: &DatabaseConnection,
    subscription_id: i64,
    cancellation_date: NaiveDate,
) -> Result<Option<subscription::Model>> {
    let Some(existing) = Subscription::find_by_id(subscription_id).one(db).await? else {
        return Ok(None);
    };

    let mut active_model: subscription::ActiveModel = existing.into();
    active_model.is_active = Set(false);
    active_model.cancellation_date = Set(Some(cancellation_date));

    Ok(Some(active_model.update(db).await?))
}

/// All recurring definitions for an owner, active first.
pub async fn get_recurring_transactions(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<recurring_transaction::Model>> {
    RecurringTransaction::find()
        .filter(recurring_transaction::Column::UserId.eq(user_id))
        .order_by_desc(recurring_transaction::Column::IsActive)
        .order_by_asc(recurring_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Active subscriptions for an owner, next charge first.
pub async fn get_active_subscriptions(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<subscription::Model>> {
    Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .filter(subscription::Column::IsActive.eq(true))
        .order_by_asc(subscription::Column::NextBillingDate)
        .all(db)
        .await
        .map_err(Into::into)
}
