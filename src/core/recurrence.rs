//! Recurrence engine - turns due recurring definitions and subscriptions into ledger entries.
//!
//! For every active definition whose due date is on or before the reference day, one
//! ledger entry dated the reference day is written through [`MaterializeEvent`] (balance
//! and budget move with it), and the definition's schedule advances by exactly one
//! period. A definition that is several periods behind catches up one period per tick.
//!
//! Each public operation is one unit of work: either every due item of the tick is
//! committed, or none is and the next tick retries from the unchanged schedule.

use crate::{
    core::{
        ledger::{EntrySource, MaterializeEvent},
        schedule, state,
    },
    entities::{
        Direction, RecurringTransaction, Subscription, recurring_transaction, subscription,
        transaction,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Category used for every subscription charge
pub const SUBSCRIPTION_CATEGORY: &str = "Subscriptions";

/// Summary of one materialization run
#[derive(Debug, Clone)]
pub struct MaterializationReport {
    /// Day every generated entry is dated
    pub reference_date: NaiveDate,
    /// Entries written, in processing order
    pub entries: Vec<transaction::Model>,
    /// Recurring definitions that passed their end date and were deactivated
    pub deactivated: usize,
    /// Expense entries that were absorbed by a budget period
    pub budgets_updated: usize,
}

impl MaterializationReport {
    const fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            entries: Vec::new(),
            deactivated: 0,
            budgets_updated: 0,
        }
    }

    /// Number of entries written
    #[must_use]
    pub fn entries_created(&self) -> usize {
        self.entries.len()
    }
}

/// Materializes every due recurring definition and subscription in one unit of work.
#[instrument(skip(db))]
pub async fn materialize_due(
    db: &DatabaseConnection,
    reference_date: NaiveDate,
) -> Result<MaterializationReport> {
    let txn = db.begin().await?;
    let mut report = MaterializationReport::new(reference_date);

    process_recurring(&txn, &mut report).await?;
    process_subscriptions(&txn, &mut report).await?;

    state::record_run(&txn, state::LAST_RECURRING_RUN_KEY, reference_date).await?;
    state::record_run(&txn, state::LAST_SUBSCRIPTION_RUN_KEY, reference_date).await?;
    txn.commit().await?;

    info!(
        "Materialized {} entries for {}",
        report.entries_created(),
        reference_date
    );
    Ok(report)
}

/// Materializes due recurring transaction definitions only.
#[instrument(skip(db))]
pub async fn materialize_due_recurring(
    db: &DatabaseConnection,
    reference_date: NaiveDate,
) -> Result<MaterializationReport> {
    let txn = db.begin().await?;
    let mut report = MaterializationReport::new(reference_date);

    process_recurring(&txn, &mut report).await?;

    state::record_run(&txn, state::LAST_RECURRING_RUN_KEY, reference_date).await?;
    txn.commit().await?;

    info!(
        "Processed {} recurring transactions ({} deactivated)",
        report.entries_created(),
        report.deactivated
    );
    Ok(report)
}

/// Bills due subscriptions only.
#[instrument(skip(db))]
pub async fn materialize_due_subscriptions(
    db: &DatabaseConnection,
    reference_date: NaiveDate,
) -> Result<MaterializationReport> {
    let txn = db.begin().await?;
    let mut report = MaterializationReport::new(reference_date);

    process_subscriptions(&txn, &mut report).await?;

    state::record_run(&txn, state::LAST_SUBSCRIPTION_RUN_KEY, reference_date).await?;
    txn.commit().await?;

    info!("Processed {} subscriptions", report.entries_created());
    Ok(report)
}

/// Scheduler entry point: recurring definitions due as of today (UTC).
pub async fn run_recurring_tick(db: &DatabaseConnection) -> Result<MaterializationReport> {
    materialize_due_recurring(db, Utc::now().date_naive()).await
}

/// Scheduler entry point: subscriptions due as of today (UTC).
pub async fn run_subscription_tick(db: &DatabaseConnection) -> Result<MaterializationReport> {
    materialize_due_subscriptions(db, Utc::now().date_naive()).await
}

async fn process_recurring(txn: &DatabaseTransaction, report: &mut MaterializationReport) -> Result<()> {
    let reference_date = report.reference_date;

    let due = RecurringTransaction::find()
        .filter(recurring_transaction::Column::IsActive.eq(true))
        .filter(recurring_transaction::Column::NextOccurrence.is_not_null())
        .filter(recurring_transaction::Column::NextOccurrence.lte(reference_date))
        .order_by_asc(recurring_transaction::Column::Id)
        .all(txn)
        .await?;

    for definition in due {
        let Some(due_date) = definition.next_occurrence else {
            continue;
        };

        let outcome = MaterializeEvent {
            user_id: definition.user_id.clone(),
            account_id: definition.account_id,
            direction: definition.direction,
            amount: definition.amount,
            category: definition.category.clone(),
            description: format!("{} (Auto-generated)", definition.name),
            date: reference_date,
            source: EntrySource::Recurring(definition.id),
        }
        .apply(txn)
        .await?;

        let next = schedule::advance_by_tag(due_date, &definition.frequency)
            .ok_or(Error::DateOverflow { date: due_date })?;
        let expired = definition.end_date.is_some_and(|end| next > end);

        debug!(
            definition_id = definition.id,
            user_id = %definition.user_id,
            %next,
            expired,
            "Processed recurring transaction {}",
            definition.name
        );

        let mut active_model: recurring_transaction::ActiveModel = definition.into();
        active_model.next_occurrence = Set(Some(next));
        if expired {
            active_model.is_active = Set(false);
            report.deactivated += 1;
        }
        active_model.update(txn).await?;

        if outcome.budget_updated {
            report.budgets_updated += 1;
        }
        report.entries.push(outcome.entry);
    }

    Ok(())
}

async fn process_subscriptions(txn: &DatabaseTransaction, report: &mut MaterializationReport) -> Result<()> {
    let reference_date = report.reference_date;

    let due = Subscription::find()
        .filter(subscription::Column::IsActive.eq(true))
        .filter(subscription::Column::NextBillingDate.lte(reference_date))
        .order_by_asc(subscription::Column::Id)
        .all(txn)
        .await?;

    for sub in due {
        let due_date = sub.next_billing_date;

        let outcome = MaterializeEvent {
            user_id: sub.user_id.clone(),
            account_id: sub.account_id,
            direction: Direction::Expense,
            amount: sub.amount,
            category: SUBSCRIPTION_CATEGORY.to_string(),
            description: format!("{} subscription", sub.service_name),
            date: reference_date,
            source: EntrySource::Subscription(sub.id),
        }
        .apply(txn)
        .await?;

        let next = schedule::advance_by_tag(due_date, &sub.billing_cycle)
            .ok_or(Error::DateOverflow { date: due_date })?;

        debug!(
            subscription_id = sub.id,
            user_id = %sub.user_id,
            %next,
            "Processed subscription {}",
            sub.service_name
        );

        let mut active_model: subscription::ActiveModel = sub.into();
        active_model.next_billing_date = Set(next);
        active_model.update(txn).await?;

        if outcome.budget_updated {
            report.budgets_updated += 1;
        }
        report.entries.push(outcome.entry);
    }

    Ok(())
}
