//! Ledger business logic - accounts, ledger entries and the materialize event.
//!
//! A ledger entry never exists without its balance change, and an expense never exists
//! without its budget consumption. [`MaterializeEvent::apply`] is the only place that
//! writes entries, and it only accepts an open [`DatabaseTransaction`], so the three
//! writes always land in the same unit of work as whatever else the caller is doing.

use crate::{
    core::budget,
    entities::{Account, Direction, Transaction, account, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::debug;

/// Where a ledger entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    /// Typed in by the user
    Manual,
    /// Generated from a recurring transaction definition
    Recurring(i64),
    /// Generated from a subscription
    Subscription(i64),
}

/// A single logical ledger event: one entry, its balance change and its budget effect.
#[derive(Debug, Clone)]
pub struct MaterializeEvent {
    /// Owner of the entry
    pub user_id: String,
    /// Account the entry is posted against
    pub account_id: i64,
    /// Income or expense
    pub direction: Direction,
    /// Positive amount
    pub amount: f64,
    /// Category label, also used to find the budget period
    pub category: String,
    /// Human-readable description
    pub description: String,
    /// Day the entry is dated; also selects the budget period
    pub date: NaiveDate,
    /// Origin of the entry
    pub source: EntrySource,
}

/// What applying a [`MaterializeEvent`] changed
#[derive(Debug, Clone)]
pub struct MaterializeOutcome {
    /// The ledger entry that was written
    pub entry: transaction::Model,
    /// Account balance after the change
    pub new_balance: f64,
    /// Whether a matching budget period absorbed the expense
    pub budget_updated: bool,
}

impl MaterializeEvent {
    /// Applies the event inside `txn`.
    ///
    /// The account balance moves by `+amount` for income and `-amount` for expenses. For
    /// expenses, the budget period for (owner, category, month, year) of `date` has its
    /// `spent_amount` increased; if there is no such period nothing else is touched.
    ///
    /// # Errors
    /// `AccountNotFound` if the target account does not exist, or any store failure.
    /// Nothing is committed here; the caller owns the transaction.
    pub async fn apply(self, txn: &DatabaseTransaction) -> Result<MaterializeOutcome> {
        let updated = adjust_account_balance(txn, self.account_id, self.direction.signed(self.amount)).await?;

        let (recurring_transaction_id, subscription_id) = match self.source {
            EntrySource::Manual => (None, None),
            EntrySource::Recurring(id) => (Some(id), None),
            EntrySource::Subscription(id) => (None, Some(id)),
        };

        let entry = transaction::ActiveModel {
            user_id: Set(self.user_id.clone()),
            account_id: Set(self.account_id),
            direction: Set(self.direction),
            amount: Set(self.amount),
            category: Set(self.category.clone()),
            description: Set(self.description),
            transaction_date: Set(self.date),
            created_at: Set(Utc::now()),
            recurring_transaction_id: Set(recurring_transaction_id),
            subscription_id: Set(subscription_id),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        let budget_updated = match self.direction {
            Direction::Expense => {
                budget::add_spending(txn, &self.user_id, &self.category, self.date, self.amount).await?
            }
            Direction::Income => false,
        };

        debug!(
            entry_id = entry.id,
            account_id = self.account_id,
            budget_updated,
            "Ledger entry written"
        );

        Ok(MaterializeOutcome {
            entry,
            new_balance: updated.balance,
            budget_updated,
        })
    }
}

/// Input for [`record_transaction`]
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Account to post against
    pub account_id: i64,
    /// Income or expense
    pub direction: Direction,
    /// Positive amount
    pub amount: f64,
    /// Category label
    pub category: String,
    /// Description
    pub description: String,
    /// Day of the entry
    pub date: NaiveDate,
}

/// Opens a new account for `user_id` with an opening balance.
pub async fn create_account(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    opening_balance: f64,
) -> Result<account::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Account name cannot be empty".to_string(),
        });
    }

    if !opening_balance.is_finite() {
        return Err(Error::InvalidAmount {
            amount: opening_balance,
        });
    }

    let now = Utc::now();
    let account = account::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.trim().to_string()),
        balance: Set(opening_balance),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    account.insert(db).await.map_err(Into::into)
}

/// Finds an account by id.
pub async fn get_account_by_id<C>(db: &C, account_id: i64) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Atomically adds `amount_delta` to an account balance.
///
/// Uses a single `UPDATE accounts SET balance = balance + ?` statement so concurrent
/// writers cannot lose updates.
///
/// # Returns
/// The updated account model
pub async fn adjust_account_balance<C>(
    db: &C,
    account_id: i64,
    amount_delta: f64,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let result = Account::update_many()
        .col_expr(
            account::Column::Balance,
            Expr::col(account::Column::Balance).add(amount_delta),
        )
        .col_expr(account::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(account::Column::Id.eq(account_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::AccountNotFound { id: account_id });
    }

    get_account_by_id(db, account_id)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })
}

/// Records a user-entered ledger entry together with its balance and budget effects.
pub async fn record_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    new: NewTransaction,
) -> Result<transaction::Model> {
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    let txn = db.begin().await?;

    let outcome = MaterializeEvent {
        user_id: user_id.to_string(),
        account_id: new.account_id,
        direction: new.direction,
        amount: new.amount,
        category: new.category,
        description: new.description,
        date: new.date,
        source: EntrySource::Manual,
    }
    .apply(&txn)
    .await?;

    txn.commit().await?;

    Ok(outcome.entry)
}

/// Entries for `user_id` dated within `[start, end]` inclusive, oldest first.
pub async fn get_transactions_between<C>(
    db: &C,
    user_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::TransactionDate.between(start, end))
        .order_by_asc(transaction::Column::TransactionDate)
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All entries posted against an account, newest first.
pub async fn get_transactions_for_account(
    db: &DatabaseConnection,
    account_id: i64,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::AccountId.eq(account_id))
        .order_by_desc(transaction::Column::TransactionDate)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
