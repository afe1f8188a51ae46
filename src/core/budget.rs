//! Budget business logic - monthly allotments per category and their consumption.
//!
//! Budget periods are keyed by (owner, category, month, year). Consumption is only ever
//! increased by ledger writes through [`add_spending`]; a write for a period that has no
//! budget is silently ignored.

use crate::{
    entities::{Budget, budget},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{
    QueryOrder, Set,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

/// Creates or updates the budget for (owner, category, month, year).
///
/// On update the name and allotment change; accumulated `spent_amount` is kept.
pub async fn upsert_budget(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    category: &str,
    month: u32,
    year: i32,
    amount: f64,
) -> Result<budget::Model> {
    if !(1..=12).contains(&month) {
        return Err(Error::InvalidPeriod { month, year });
    }

    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let now = Utc::now();
    let model = budget::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        category: Set(category.to_string()),
        amount: Set(amount),
        spent_amount: Set(0.0),
        month: Set(month),
        year: Set(year),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Budget::insert(model)
        .on_conflict(
            OnConflict::columns([
                budget::Column::UserId,
                budget::Column::Category,
                budget::Column::Month,
                budget::Column::Year,
            ])
            .update_columns([
                budget::Column::Name,
                budget::Column::Amount,
                budget::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec(db)
        .await?;

    get_budget_for_period(db, user_id, category, month, year)
        .await?
        .ok_or_else(|| Error::Database(DbErr::RecordNotFound(format!("budget {category} {month}/{year}"))))
}

/// Finds the budget for (owner, category, month, year), if one exists.
pub async fn get_budget_for_period<C>(
    db: &C,
    user_id: &str,
    category: &str,
    month: u32,
    year: i32,
) -> Result<Option<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::Category.eq(category))
        .filter(budget::Column::Month.eq(month))
        .filter(budget::Column::Year.eq(year))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All budgets an owner has for one calendar month, ordered by category.
pub async fn get_budgets_for_month<C>(
    db: &C,
    user_id: &str,
    month: u32,
    year: i32,
) -> Result<Vec<budget::Model>>
where
    C: ConnectionTrait,
{
    Budget::find()
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::Month.eq(month))
        .filter(budget::Column::Year.eq(year))
        .order_by_asc(budget::Column::Category)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds `amount` to the matching budget's `spent_amount` in a single atomic update.
///
/// The period is the calendar month of `date`.
///
/// # Returns
/// * `Ok(true)` - A budget period matched and was updated
/// * `Ok(false)` - No budget exists for that category and month; nothing changed
pub async fn add_spending<C>(
    db: &C,
    user_id: &str,
    category: &str,
    date: NaiveDate,
    amount: f64,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Budget::update_many()
        .col_expr(
            budget::Column::SpentAmount,
            Expr::col(budget::Column::SpentAmount).add(amount),
        )
        .col_expr(budget::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(budget::Column::UserId.eq(user_id))
        .filter(budget::Column::Category.eq(category))
        .filter(budget::Column::Month.eq(date.month()))
        .filter(budget::Column::Year.eq(date.year()))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}
