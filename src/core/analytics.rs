//! Monthly analytics with a read-through cache.
//!
//! Aggregates computed from ledger entries are cached per (owner, month, year) in the
//! `analytics_summaries` table and served for up to [`CACHE_TTL_MINUTES`]. Budget and
//! goal snapshots are never cached; every response reads them live. Per-source income
//! and the top expense list are only available on a fresh computation.

use crate::{
    core::{budget, goal, ledger, percentage_of},
    entities::{AnalyticsSummary, Direction, analytics_summary, budget as budget_entity, goal as goal_entity, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Cached aggregates younger than this are served without recomputation
pub const CACHE_TTL_MINUTES: i64 = 60;

/// Number of entries in [`TransactionDetail::top_expenses`]
pub const TOP_EXPENSE_LIMIT: usize = 10;

/// Longest trend a caller may ask for, one hundred years
pub const MAX_TREND_MONTHS: u32 = 1200;

/// The cacheable part of a monthly report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAggregates {
    /// Sum of income entries
    pub total_income: f64,
    /// Income from recurring definitions
    pub recurring_income: f64,
    /// Sum of expense entries
    pub total_expenses: f64,
    /// Expenses from recurring definitions and subscriptions
    pub recurring_expenses: f64,
    /// Income minus expenses
    pub net_savings: f64,
    /// Net savings as a percentage of income; 0 without income
    pub savings_rate: f64,
    /// Expenses divided by the number of days in the month
    pub average_daily_spending: f64,
    /// Expense totals per category
    pub expenses_by_category: BTreeMap<String, f64>,
}

/// Per-entry detail that is only available on a fresh computation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionDetail {
    /// Income grouped by category
    pub income_by_source: BTreeMap<String, f64>,
    /// Largest expenses, biggest first
    pub top_expenses: Vec<TopExpense>,
}

/// One row of the top expense list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopExpense {
    /// Entry description
    pub description: String,
    /// Category label
    pub category: String,
    /// Amount
    pub amount: f64,
    /// Day of the entry
    pub date: NaiveDate,
}

/// Live snapshot of the month's budgets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    /// Sum of budget allotments
    pub total_budgeted: f64,
    /// Sum of budget consumption
    pub total_spent: f64,
    /// Allotments minus consumption
    pub remaining: f64,
    /// One item per budget, by category
    pub items: Vec<BudgetItem>,
}

/// One budget in a [`BudgetSummary`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetItem {
    /// Category label
    pub category: String,
    /// Allotment
    pub budgeted: f64,
    /// Consumption
    pub spent: f64,
    /// Spent as a percentage of budgeted, two decimals
    pub percentage: f64,
}

/// Live snapshot of the owner's goals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    /// Active plus completed goals
    pub total_goals: u64,
    /// Goals still being saved for
    pub active_goals: u64,
    /// Goals that reached their target
    pub completed_goals: u64,
    /// Sum of active goal targets
    pub total_target_amount: f64,
    /// Sum of active goal balances
    pub total_current_amount: f64,
    /// Active goals, soonest deadline first
    pub goals: Vec<GoalItem>,
}

/// One active goal in a [`GoalProgress`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalItem {
    /// Goal id
    pub id: i64,
    /// Goal name
    pub name: String,
    /// Amount to reach
    pub target_amount: f64,
    /// Amount saved so far
    pub current_amount: f64,
    /// Saved as a percentage of the target
    pub progress_percentage: f64,
    /// Deadline, if any
    pub target_date: Option<NaiveDate>,
    /// Whole days until the target date; 0 without one, negative once past
    pub days_remaining: i64,
}

/// Monthly analytics report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAnalytics {
    /// Calendar month, 1-12
    pub month: u32,
    /// Calendar year
    pub year: i32,
    /// Cached or freshly computed aggregates
    pub aggregates: MonthlyAggregates,
    /// Present only when the aggregates were computed for this response
    pub detail: Option<TransactionDetail>,
    /// Always read live
    pub budget_summary: BudgetSummary,
    /// Always read live
    pub goal_progress: GoalProgress,
    /// Whether `aggregates` came from the cache
    pub from_cache: bool,
    /// When `aggregates` were computed
    pub generated_at: DateTime<Utc>,
}

/// Expense total for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// `"YYYY-MM"`
    pub period: String,
    /// Amount
    pub amount: f64,
}

/// First and last day of a calendar month.
///
/// # Errors
/// `InvalidPeriod` when `month` is outside 1-12 or the year is out of range.
pub fn month_window(month: u32, year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(Error::InvalidPeriod { month, year })?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or(Error::InvalidPeriod { month, year })?;
    Ok((first, last))
}

/// Whether a summary generated at `generated_at` may still be served at `now`.
#[must_use]
pub fn is_fresh(generated_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - generated_at < Duration::minutes(CACHE_TTL_MINUTES)
}

/// Aggregates a month of entries. `days_in_month` must be the length of that month.
#[must_use]
pub fn compute_aggregates(entries: &[transaction::Model], days_in_month: u32) -> MonthlyAggregates {
    let mut aggregates = MonthlyAggregates {
        total_income: 0.0,
        recurring_income: 0.0,
        total_expenses: 0.0,
        recurring_expenses: 0.0,
        net_savings: 0.0,
        savings_rate: 0.0,
        average_daily_spending: 0.0,
        expenses_by_category: BTreeMap::new(),
    };

    for entry in entries {
        match entry.direction {
            Direction::Income => {
                aggregates.total_income += entry.amount;
                if entry.is_generated() {
                    aggregates.recurring_income += entry.amount;
                }
            }
            Direction::Expense => {
                aggregates.total_expenses += entry.amount;
                if entry.is_generated() {
                    aggregates.recurring_expenses += entry.amount;
                }
                *aggregates
                    .expenses_by_category
                    .entry(entry.category.clone())
                    .or_insert(0.0) += entry.amount;
            }
        }
    }

    aggregates.net_savings = aggregates.total_income - aggregates.total_expenses;
    if aggregates.total_income > 0.0 {
        aggregates.savings_rate = aggregates.net_savings / aggregates.total_income * 100.0;
    }
    if days_in_month > 0 {
        aggregates.average_daily_spending = aggregates.total_expenses / f64::from(days_in_month);
    }

    aggregates
}

/// Income by source and the largest expenses of a month of entries.
#[must_use]
pub fn compute_detail(entries: &[transaction::Model]) -> TransactionDetail {
    let mut income_by_source = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.direction == Direction::Income) {
        *income_by_source.entry(entry.category.clone()).or_insert(0.0) += entry.amount;
    }

    let mut expenses: Vec<&transaction::Model> = entries
        .iter()
        .filter(|e| e.direction == Direction::Expense)
        .collect();
    expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let top_expenses = expenses
        .into_iter()
        .take(TOP_EXPENSE_LIMIT)
        .map(|e| TopExpense {
            description: e.description.clone(),
            category: e.category.clone(),
            amount: e.amount,
            date: e.transaction_date,
        })
        .collect();

    TransactionDetail {
        income_by_source,
        top_expenses,
    }
}

/// Decodes a cached category map. Missing or malformed payloads yield an empty map.
#[must_use]
pub fn decode_category_map(json: Option<&str>) -> BTreeMap<String, f64> {
    let Some(json) = json else {
        return BTreeMap::new();
    };

    serde_json::from_str(json).unwrap_or_else(|e| {
        warn!("Ignoring malformed cached category breakdown: {}", e);
        BTreeMap::new()
    })
}

impl From<&analytics_summary::Model> for MonthlyAggregates {
    fn from(row: &analytics_summary::Model) -> Self {
        Self {
            total_income: row.total_income,
            recurring_income: row.recurring_income,
            total_expenses: row.total_expenses,
            recurring_expenses: row.recurring_expenses,
            net_savings: row.net_savings,
            savings_rate: row.savings_rate,
            average_daily_spending: row.average_daily_spending,
            expenses_by_category: decode_category_map(row.expenses_by_category_json.as_deref()),
        }
    }
}

/// Monthly analytics for `user_id`; the period defaults to the current UTC month.
pub async fn get_monthly_analytics(
    db: &DatabaseConnection,
    user_id: &str,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<MonthlyAnalytics> {
    let now = Utc::now();
    get_monthly_analytics_at(
        db,
        user_id,
        month.unwrap_or_else(|| now.month()),
        year.unwrap_or_else(|| now.year()),
        now,
    )
    .await
}

/// Cache-aside read of one month's analytics as of `now`.
///
/// A cached summary younger than [`CACHE_TTL_MINUTES`] supplies the aggregates;
/// otherwise they are recomputed from ledger entries and the cached row is overwritten.
#[instrument(skip(db))]
pub async fn get_monthly_analytics_at(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
    now: DateTime<Utc>,
) -> Result<MonthlyAnalytics> {
    let (first, last) = month_window(month, year)?;

    let cached = find_summary(db, user_id, month, year).await?;

    let (aggregates, detail, from_cache, generated_at) = match cached {
        Some(row) if is_fresh(row.generated_at, now) => {
            debug!("Serving cached analytics generated at {}", row.generated_at);
            (MonthlyAggregates::from(&row), None, true, row.generated_at)
        }
        _ => {
            let entries = ledger::get_transactions_between(db, user_id, first, last).await?;
            let aggregates = compute_aggregates(&entries, last.day());
            let detail = compute_detail(&entries);
            store_summary(db, user_id, month, year, &aggregates, now).await?;
            (aggregates, Some(detail), false, now)
        }
    };

    Ok(MonthlyAnalytics {
        month,
        year,
        aggregates,
        detail,
        budget_summary: budget_summary(db, user_id, month, year).await?,
        goal_progress: goal_progress(db, user_id, now.date_naive()).await?,
        from_cache,
        generated_at,
    })
}

/// Recomputes and stores one month's summary regardless of freshness.
pub async fn regenerate_analytics(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
) -> Result<analytics_summary::Model> {
    regenerate_analytics_at(db, user_id, month, year, Utc::now()).await
}

/// Recomputes and stores one month's summary as of `now`, returning the stored row.
#[instrument(skip(db))]
pub async fn regenerate_analytics_at(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
    now: DateTime<Utc>,
) -> Result<analytics_summary::Model> {
    let (first, last) = month_window(month, year)?;
    let entries = ledger::get_transactions_between(db, user_id, first, last).await?;
    let aggregates = compute_aggregates(&entries, last.day());

    store_summary(db, user_id, month, year, &aggregates, now).await?;
    info!("Regenerated analytics for {} {}/{}", user_id, month, year);

    find_summary(db, user_id, month, year)
        .await?
        .ok_or_else(|| Error::Database(DbErr::RecordNotFound(format!("analytics {month}/{year}"))))
}

/// Total expenses for each of the last `months_back` months, most recent first.
///
/// # Errors
/// `LookbackTooLong` when `months_back` exceeds [`MAX_TREND_MONTHS`].
pub async fn spending_trend(db: &DatabaseConnection, user_id: &str, months_back: u32) -> Result<Vec<TrendPoint>> {
    spending_trend_at(db, user_id, months_back, Utc::now().date_naive()).await
}

/// [`spending_trend`] with the current month taken from `today`.
pub async fn spending_trend_at(
    db: &DatabaseConnection,
    user_id: &str,
    months_back: u32,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    expense_trend(db, user_id, None, months_back, today).await
}

/// Expenses in one category for each of the last `months_back` months, most recent first.
pub async fn category_trend(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    months_back: u32,
) -> Result<Vec<TrendPoint>> {
    category_trend_at(db, user_id, category, months_back, Utc::now().date_naive()).await
}

/// [`category_trend`] with the current month taken from `today`.
pub async fn category_trend_at(
    db: &DatabaseConnection,
    user_id: &str,
    category: &str,
    months_back: u32,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    expense_trend(db, user_id, Some(category), months_back, today).await
}

async fn expense_trend(
    db: &DatabaseConnection,
    user_id: &str,
    category: Option<&str>,
    months_back: u32,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    if months_back > MAX_TREND_MONTHS {
        return Err(Error::LookbackTooLong {
            months: months_back,
            max: MAX_TREND_MONTHS,
        });
    }

    let current = today.with_day(1).ok_or(Error::DateOverflow { date: today })?;
    let mut points = Vec::new();

    for offset in 0..months_back {
        let first = current
            .checked_sub_months(Months::new(offset))
            .ok_or(Error::DateOverflow { date: current })?;
        let (first, last) = month_window(first.month(), first.year())?;

        let amount = ledger::get_transactions_between(db, user_id, first, last)
            .await?
            .iter()
            .filter(|e| e.direction == Direction::Expense)
            .filter(|e| category.is_none_or(|c| e.category == c))
            .map(|e| e.amount)
            .sum();

        points.push(TrendPoint {
            period: first.format("%Y-%m").to_string(),
            amount,
        });
    }

    Ok(points)
}

async fn find_summary(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
) -> Result<Option<analytics_summary::Model>> {
    AnalyticsSummary::find()
        .filter(analytics_summary::Column::UserId.eq(user_id))
        .filter(analytics_summary::Column::Month.eq(month))
        .filter(analytics_summary::Column::Year.eq(year))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts or overwrites the cached row for (owner, month, year).
async fn store_summary(
    db: &DatabaseConnection,
    user_id: &str,
    month: u32,
    year: i32,
    aggregates: &MonthlyAggregates,
    now: DateTime<Utc>,
) -> Result<()> {
    let categories = serde_json::to_string(&aggregates.expenses_by_category)?;

    let row = analytics_summary::ActiveModel {
        user_id: Set(user_id.to_string()),
        month: Set(month),
        year: Set(year),
        total_income: Set(aggregates.total_income),
        recurring_income: Set(aggregates.recurring_income),
        total_expenses: Set(aggregates.total_expenses),
        recurring_expenses: Set(aggregates.recurring_expenses),
        expenses_by_category_json: Set(Some(categories)),
        net_savings: Set(aggregates.net_savings),
        savings_rate: Set(aggregates.savings_rate),
        average_daily_spending: Set(aggregates.average_daily_spending),
        generated_at: Set(now),
        ..Default::default()
    };

    AnalyticsSummary::insert(row)
        .on_conflict(
            OnConflict::columns([
                analytics_summary::Column::UserId,
                analytics_summary::Column::Month,
                analytics_summary::Column::Year,
            ])
            .update_columns([
                analytics_summary::Column::TotalIncome,
                analytics_summary::Column::RecurringIncome,
                analytics_summary::Column::TotalExpenses,
                analytics_summary::Column::RecurringExpenses,
                analytics_summary::Column::ExpensesByCategoryJson,
                analytics_summary::Column::NetSavings,
                analytics_summary::Column::SavingsRate,
                analytics_summary::Column::AverageDailySpending,
                analytics_summary::Column::GeneratedAt,
            ])
            .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}

async fn budget_summary(db: &DatabaseConnection, user_id: &str, month: u32, year: i32) -> Result<BudgetSummary> {
    let budgets = budget::get_budgets_for_month(db, user_id, month, year).await?;

    Ok(BudgetSummary {
        total_budgeted: budgets.iter().map(|b| b.amount).sum(),
        total_spent: budgets.iter().map(|b| b.spent_amount).sum(),
        remaining: budgets.iter().map(budget_entity::Model::remaining_amount).sum(),
        items: budgets
            .iter()
            .map(|b| BudgetItem {
                category: b.category.clone(),
                budgeted: b.amount,
                spent: b.spent_amount,
                percentage: percentage_of(b.spent_amount, b.amount),
            })
            .collect(),
    })
}

async fn goal_progress(db: &DatabaseConnection, user_id: &str, today: NaiveDate) -> Result<GoalProgress> {
    let active = goal::get_active_goals(db, user_id).await?;
    let completed_goals = goal::count_completed_goals(db, user_id).await?;
    let active_goals = active.len() as u64;

    Ok(GoalProgress {
        total_goals: active_goals + completed_goals,
        active_goals,
        completed_goals,
        total_target_amount: active.iter().map(|g| g.target_amount).sum(),
        total_current_amount: active.iter().map(|g| g.current_amount).sum(),
        goals: active.iter().map(|g| goal_item(g, today)).collect(),
    })
}

fn goal_item(g: &goal_entity::Model, today: NaiveDate) -> GoalItem {
    GoalItem {
        id: g.id,
        name: g.name.clone(),
        target_amount: g.target_amount,
        current_amount: g.current_amount,
        progress_percentage: g.progress_percentage(),
        target_date: g.target_date,
        days_remaining: g.target_date.map_or(0, |target| (target - today).num_days()),
    }
}
