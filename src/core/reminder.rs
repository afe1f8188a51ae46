//! Reminder engine - delivers due reminders, chains recurring ones and synthesizes new ones.
//!
//! Delivery only marks a reminder as sent. A recurring reminder is never moved in place;
//! instead a fresh, unsent successor is written one period later.

use crate::{
    core::{budget, goal, schedule, schedule::Frequency, state},
    entities::{Reminder, ReminderKind, Subscription, reminder, subscription},
    errors::{Error, Result},
};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument};

/// Days ahead a subscription renewal is considered upcoming
const SUBSCRIPTION_LOOKAHEAD_DAYS: u64 = 7;
/// Days before billing the renewal reminder fires
const SUBSCRIPTION_LEAD_DAYS: u64 = 3;
/// Days ahead a goal deadline is considered upcoming
const GOAL_LOOKAHEAD_DAYS: u64 = 30;
/// Days before the deadline the goal reminder fires
const GOAL_LEAD_DAYS: u64 = 7;
/// Consumption percentage at which a budget alert is raised
const BUDGET_ALERT_THRESHOLD: f64 = 80.0;

const RELATED_SUBSCRIPTION: &str = "subscription";
const RELATED_GOAL: &str = "goal";
const RELATED_BUDGET: &str = "budget";

/// Input for [`create_reminder`]
#[derive(Debug, Clone)]
pub struct NewReminder {
    /// Short headline
    pub title: String,
    /// Longer text
    pub description: String,
    /// What the reminder is about
    pub kind: ReminderKind,
    /// When it becomes due
    pub reminder_date: DateTime<Utc>,
    /// Whether a successor is written once it is sent
    pub is_recurring: bool,
    /// Period between a reminder and its successor
    pub frequency: Option<Frequency>,
    /// Id of the related subscription, goal or budget
    pub related_entity_id: Option<i64>,
    /// Kind of the related entity
    pub related_entity_type: Option<String>,
}

/// Outcome of a due-reminder pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunReport {
    /// Reminders marked as sent
    pub sent: usize,
    /// Successor reminders written for recurring ones
    pub successors: usize,
}

/// Reminders written by a synthesis pass, per source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoGenerateReport {
    /// Subscription renewal reminders
    pub subscriptions: usize,
    /// Goal deadline reminders
    pub goals: usize,
    /// Budget limit reminders
    pub budgets: usize,
}

impl AutoGenerateReport {
    /// Total reminders written
    #[must_use]
    pub const fn total(&self) -> usize {
        self.subscriptions + self.goals + self.budgets
    }
}

/// A pending reminder together with its urgency flag
#[derive(Debug, Clone, serde::Serialize)]
pub struct UpcomingReminder {
    /// The reminder
    pub reminder: reminder::Model,
    /// Due within one day of now, overdue included
    pub is_urgent: bool,
}

/// Stores a new, unsent, active reminder for `user_id`.
pub async fn create_reminder<C>(db: &C, user_id: &str, new: NewReminder) -> Result<reminder::Model>
where
    C: ConnectionTrait,
{
    let reminder = reminder::ActiveModel {
        user_id: Set(user_id.to_string()),
        title: Set(new.title),
        description: Set(new.description),
        kind: Set(new.kind),
        reminder_date: Set(new.reminder_date),
        is_recurring: Set(new.is_recurring),
        frequency: Set(new.frequency.map(|f| f.as_str().to_string())),
        is_sent: Set(false),
        is_active: Set(true),
        related_entity_id: Set(new.related_entity_id),
        related_entity_type: Set(new.related_entity_type),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    reminder.insert(db).await.map_err(Into::into)
}

/// Scheduler entry point: processes everything due as of now.
pub async fn process_due_reminders(db: &DatabaseConnection) -> Result<ReminderRunReport> {
    process_due_reminders_at(db, Utc::now()).await
}

/// Marks every active, unsent reminder due at or before `now` as sent and writes the
/// successors of recurring ones, all in one unit of work.
#[instrument(skip(db))]
pub async fn process_due_reminders_at(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<ReminderRunReport> {
    let txn = db.begin().await?;

    let due = Reminder::find()
        .filter(reminder::Column::IsActive.eq(true))
        .filter(reminder::Column::IsSent.eq(false))
        .filter(reminder::Column::ReminderDate.lte(now))
        .order_by_asc(reminder::Column::ReminderDate)
        .order_by_asc(reminder::Column::Id)
        .all(&txn)
        .await?;

    let mut report = ReminderRunReport::default();

    for current in due {
        let successor = match (current.is_recurring, current.frequency.as_deref()) {
            (true, Some(tag)) => {
                let next_date = schedule::advance_instant_by_tag(current.reminder_date, tag).ok_or(
                    Error::DateOverflow {
                        date: current.reminder_date.date_naive(),
                    },
                )?;
                Some(reminder::ActiveModel {
                    user_id: Set(current.user_id.clone()),
                    title: Set(current.title.clone()),
                    description: Set(current.description.clone()),
                    kind: Set(current.kind),
                    reminder_date: Set(next_date),
                    is_recurring: Set(true),
                    frequency: Set(current.frequency.clone()),
                    is_sent: Set(false),
                    is_active: Set(true),
                    related_entity_id: Set(current.related_entity_id),
                    related_entity_type: Set(current.related_entity_type.clone()),
                    created_at: Set(now),
                    ..Default::default()
                })
            }
            _ => None,
        };

        debug!(reminder_id = current.id, user_id = %current.user_id, "Sending reminder: {}", current.title);

        let mut active_model: reminder::ActiveModel = current.into();
        active_model.is_sent = Set(true);
        active_model.update(&txn).await?;
        report.sent += 1;

        if let Some(next) = successor {
            next.insert(&txn).await?;
            report.successors += 1;
        }
    }

    state::record_run(&txn, state::LAST_REMINDER_RUN_KEY, now.date_naive()).await?;
    txn.commit().await?;

    info!(
        "Processed {} due reminders ({} recurring successors)",
        report.sent, report.successors
    );
    Ok(report)
}

/// Synthesizes reminders for `user_id` as of now.
pub async fn auto_generate_reminders(db: &DatabaseConnection, user_id: &str) -> Result<AutoGenerateReport> {
    auto_generate_reminders_at(db, user_id, Utc::now()).await
}

/// Writes reminders for upcoming subscription renewals, goal deadlines and budgets close
/// to their limit, skipping any that already have an unsent reminder.
///
/// Checks and inserts share one transaction. Two passes running at the same time for
/// the same owner can still both insert.
#[instrument(skip(db))]
pub async fn auto_generate_reminders_at(
    db: &DatabaseConnection,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<AutoGenerateReport> {
    let today = now.date_naive();
    let txn = db.begin().await?;
    let mut report = AutoGenerateReport::default();

    // Subscriptions renewing within a week
    let renew_before = today
        .checked_add_days(Days::new(SUBSCRIPTION_LOOKAHEAD_DAYS))
        .ok_or(Error::DateOverflow { date: today })?;
    let subscriptions = Subscription::find()
        .filter(subscription::Column::UserId.eq(user_id))
        .filter(subscription::Column::IsActive.eq(true))
        .filter(subscription::Column::NextBillingDate.lte(renew_before))
        .all(&txn)
        .await?;

    for sub in subscriptions {
        if has_unsent_reminder(&txn, user_id, ReminderKind::SubscriptionRenewal, RELATED_SUBSCRIPTION, sub.id)
            .await?
        {
            continue;
        }

        let fire_on = sub
            .next_billing_date
            .checked_sub_days(Days::new(SUBSCRIPTION_LEAD_DAYS))
            .ok_or(Error::DateOverflow {
                date: sub.next_billing_date,
            })?;

        create_reminder(
            &txn,
            user_id,
            NewReminder {
                title: format!("{} Renewal", sub.service_name),
                description: format!(
                    "Your {} subscription renews on {}",
                    sub.service_name,
                    sub.next_billing_date.format("%b %d")
                ),
                kind: ReminderKind::SubscriptionRenewal,
                reminder_date: start_of_day(fire_on),
                is_recurring: false,
                frequency: None,
                related_entity_id: Some(sub.id),
                related_entity_type: Some(RELATED_SUBSCRIPTION.to_string()),
            },
        )
        .await?;
        report.subscriptions += 1;
    }

    // Unfinished goals due within a month
    let deadline_before = today
        .checked_add_days(Days::new(GOAL_LOOKAHEAD_DAYS))
        .ok_or(Error::DateOverflow { date: today })?;
    let goals = goal::get_active_goals(&txn, user_id).await?;

    for g in goals
        .into_iter()
        .filter(|g| g.target_date.is_some_and(|target| target <= deadline_before))
        .filter(|g| g.progress_percentage() < 100.0)
    {
        if has_unsent_reminder(&txn, user_id, ReminderKind::GoalDeadline, RELATED_GOAL, g.id).await? {
            continue;
        }

        let reminder_date = match g.target_date {
            Some(target) => start_of_day(
                target
                    .checked_sub_days(Days::new(GOAL_LEAD_DAYS))
                    .ok_or(Error::DateOverflow { date: target })?,
            ),
            None => now,
        };
        let target_label = g
            .target_date
            .map_or_else(|| "none".to_string(), |d| d.format("%b %d").to_string());

        create_reminder(
            &txn,
            user_id,
            NewReminder {
                title: format!("Goal Deadline: {}", g.name),
                description: format!(
                    "Your goal '{}' is {:.1}% complete. Target date: {}",
                    g.name,
                    g.progress_percentage(),
                    target_label
                ),
                kind: ReminderKind::GoalDeadline,
                reminder_date,
                is_recurring: false,
                frequency: None,
                related_entity_id: Some(g.id),
                related_entity_type: Some(RELATED_GOAL.to_string()),
            },
        )
        .await?;
        report.goals += 1;
    }

    // Budgets of the current month at or past the alert threshold
    let (month_start, next_month_start) = month_bounds(today)?;
    let budgets = budget::get_budgets_for_month(&txn, user_id, today.month(), today.year()).await?;

    for b in budgets
        .into_iter()
        .filter(|b| b.progress_percentage() >= BUDGET_ALERT_THRESHOLD)
    {
        let existing = Reminder::find()
            .filter(reminder::Column::UserId.eq(user_id))
            .filter(reminder::Column::Kind.eq(ReminderKind::BudgetLimit))
            .filter(reminder::Column::RelatedEntityType.eq(RELATED_BUDGET))
            .filter(reminder::Column::RelatedEntityId.eq(b.id))
            .filter(reminder::Column::IsSent.eq(false))
            .filter(reminder::Column::ReminderDate.gte(month_start))
            .filter(reminder::Column::ReminderDate.lt(next_month_start))
            .count(&txn)
            .await?;
        if existing > 0 {
            continue;
        }

        create_reminder(
            &txn,
            user_id,
            NewReminder {
                title: format!("Budget Alert: {}", b.category),
                description: format!(
                    "You've used {:.1}% of your {} budget",
                    b.progress_percentage(),
                    b.category
                ),
                kind: ReminderKind::BudgetLimit,
                reminder_date: now,
                is_recurring: false,
                frequency: None,
                related_entity_id: Some(b.id),
                related_entity_type: Some(RELATED_BUDGET.to_string()),
            },
        )
        .await?;
        report.budgets += 1;
    }

    txn.commit().await?;

    info!(
        subscriptions = report.subscriptions,
        goals = report.goals,
        budgets = report.budgets,
        "Generated {} reminders",
        report.total()
    );
    Ok(report)
}

/// Pending reminders for `user_id` due within `within_days` of now.
pub async fn upcoming_reminders(
    db: &DatabaseConnection,
    user_id: &str,
    within_days: u32,
) -> Result<Vec<UpcomingReminder>> {
    upcoming_reminders_at(db, user_id, within_days, Utc::now()).await
}

/// Active, unsent reminders due no later than `now + within_days`, earliest first.
///
/// Overdue reminders are included and always urgent. A window reaching past the end of
/// the calendar has no upper bound.
pub async fn upcoming_reminders_at(
    db: &DatabaseConnection,
    user_id: &str,
    within_days: u32,
    now: DateTime<Utc>,
) -> Result<Vec<UpcomingReminder>> {
    let window_end = now.checked_add_days(Days::new(u64::from(within_days)));
    let urgent_before = now.checked_add_days(Days::new(1));

    let mut query = Reminder::find()
        .filter(reminder::Column::UserId.eq(user_id))
        .filter(reminder::Column::IsActive.eq(true))
        .filter(reminder::Column::IsSent.eq(false));
    if let Some(window_end) = window_end {
        query = query.filter(reminder::Column::ReminderDate.lte(window_end));
    }

    let reminders = query
        .order_by_asc(reminder::Column::ReminderDate)
        .order_by_asc(reminder::Column::Id)
        .all(db)
        .await?;

    Ok(reminders
        .into_iter()
        .map(|reminder| UpcomingReminder {
            is_urgent: urgent_before.is_none_or(|limit| reminder.reminder_date <= limit),
            reminder,
        })
        .collect())
}

async fn has_unsent_reminder<C>(
    db: &C,
    user_id: &str,
    kind: ReminderKind,
    related_type: &str,
    related_id: i64,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let count = Reminder::find()
        .filter(reminder::Column::UserId.eq(user_id))
        .filter(reminder::Column::Kind.eq(kind))
        .filter(reminder::Column::RelatedEntityType.eq(related_type))
        .filter(reminder::Column::RelatedEntityId.eq(related_id))
        .filter(reminder::Column::IsSent.eq(false))
        .count(db)
        .await?;

    Ok(count > 0)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Midnight of the first day of `date`'s month and of the following month.
fn month_bounds(date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let first = date.with_day(1).ok_or(Error::DateOverflow { date })?;
    let next = first
        .checked_add_months(Months::new(1))
        .ok_or(Error::DateOverflow { date })?;
    Ok((start_of_day(first), start_of_day(next)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::budget::add_spending;
    use crate::test_utils::*;

    fn custom(title: &str, reminder_date: DateTime<Utc>, frequency: Option<Frequency>) -> NewReminder {
        NewReminder {
            title: title.to_string(),
            description: String::new(),
            kind: ReminderKind::Custom,
            reminder_date,
            is_recurring: frequency.is_some(),
            frequency,
            related_entity_id: None,
            related_entity_type: None,
        }
    }

    #[tokio::test]
    async fn test_weekly_reminder_chains_one_successor() -> Result<()> {
        let db = setup_test_db().await?;
        let due = at(2024, 3, 4, 9, 0);
        let original = create_reminder(&db, "user1", custom("Pay rent", due, Some(Frequency::Weekly))).await?;

        let report = process_due_reminders_at(&db, at(2024, 3, 4, 12, 0)).await?;
        assert_eq!(report, ReminderRunReport { sent: 1, successors: 1 });

        let original = Reminder::find_by_id(original.id).one(&db).await?.unwrap();
        assert!(original.is_sent);

        let pending = Reminder::find()
            .filter(reminder::Column::IsSent.eq(false))
            .all(&db)
            .await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].reminder_date, at(2024, 3, 11, 9, 0));
        assert_eq!(pending[0].title, "Pay rent");
        assert!(pending[0].is_recurring);
        assert_eq!(pending[0].frequency.as_deref(), Some("weekly"));

        // the successor is not due yet, so a second pass does nothing
        let report = process_due_reminders_at(&db, at(2024, 3, 4, 13, 0)).await?;
        assert_eq!(report, ReminderRunReport::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_one_off_reminder_has_no_successor() -> Result<()> {
        let db = setup_test_db().await?;
        create_reminder(&db, "user1", custom("Call bank", at(2024, 3, 1, 8, 0), None)).await?;
        create_reminder(&db, "user1", custom("Later", at(2024, 3, 9, 8, 0), None)).await?;

        let report = process_due_reminders_at(&db, at(2024, 3, 2, 0, 0)).await?;
        assert_eq!(report, ReminderRunReport { sent: 1, successors: 0 });
        assert_eq!(Reminder::find().count(&db).await?, 2);
        assert_eq!(
            state::get_last_run(&db, state::LAST_REMINDER_RUN_KEY).await?,
            Some(date(2024, 3, 2))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_recurring_without_frequency_has_no_successor() -> Result<()> {
        let db = setup_test_db().await?;
        let mut new = custom("Orphan", at(2024, 3, 1, 8, 0), None);
        new.is_recurring = true;
        let orphan = create_reminder(&db, "user1", new).await?;

        let report = process_due_reminders_at(&db, at(2024, 3, 2, 0, 0)).await?;
        assert_eq!(report, ReminderRunReport { sent: 1, successors: 0 });
        assert_eq!(Reminder::find().count(&db).await?, 1);
        assert!(Reminder::find_by_id(orphan.id).one(&db).await?.unwrap().is_sent);
        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_reminder_not_processed() -> Result<()> {
        let db = setup_test_db().await?;
        let r = create_reminder(&db, "user1", custom("Muted", at(2024, 3, 1, 8, 0), None)).await?;
        let mut active_model: reminder::ActiveModel = r.into();
        active_model.is_active = Set(false);
        active_model.update(&db).await?;

        let report = process_due_reminders_at(&db, at(2024, 3, 2, 0, 0)).await?;
        assert_eq!(report.sent, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_generate_subscription_renewal() -> Result<()> {
        let db = setup_test_db().await?;
        let account = create_test_account(&db, "user1", 0.0).await?;
        let sub = create_test_subscription(&db, "user1", account.id, "Spotify", 9.99, Frequency::Monthly, date(2024, 5, 10))
            .await?;
        create_test_subscription(&db, "user1", account.id, "Far Away", 5.0, Frequency::Monthly, date(2024, 6, 30)).await?;

        let now = at(2024, 5, 5, 10, 0);
        let report = auto_generate_reminders_at(&db, "user1", now).await?;
        assert_eq!(report.subscriptions, 1);
        assert_eq!(report.total(), 1);

        let reminders = Reminder::find().all(&db).await?;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].title, "Spotify Renewal");
        assert_eq!(reminders[0].kind, ReminderKind::SubscriptionRenewal);
        assert_eq!(reminders[0].reminder_date, at(2024, 5, 7, 0, 0));
        assert_eq!(reminders[0].related_entity_id, Some(sub.id));

        // second pass finds the unsent reminder and writes nothing
        let report = auto_generate_reminders_at(&db, "user1", now).await?;
        assert_eq!(report.total(), 0);
        assert_eq!(Reminder::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_generate_goal_deadline() -> Result<()> {
        let db = setup_test_db().await?;
        let near = create_test_goal(&db, "user1", "Vacation", 1000.0, Some(date(2024, 5, 20))).await?;
        create_test_goal(&db, "user1", "House", 1000.0, Some(date(2025, 1, 1))).await?;
        create_test_goal(&db, "user1", "Someday", 1000.0, None).await?;

        let report = auto_generate_reminders_at(&db, "user1", at(2024, 5, 1, 10, 0)).await?;
        assert_eq!(report.goals, 1);

        let reminders = Reminder::find().all(&db).await?;
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].title, "Goal Deadline: Vacation");
        assert_eq!(reminders[0].reminder_date, at(2024, 5, 13, 0, 0));
        assert_eq!(reminders[0].related_entity_id, Some(near.id));

        // the unsent reminder blocks a duplicate
        let report = auto_generate_reminders_at(&db, "user1", at(2024, 5, 2, 10, 0)).await?;
        assert_eq!(report.goals, 0);
        assert_eq!(Reminder::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reached_goal_gets_no_reminder() -> Result<()> {
        let db = setup_test_db().await?;
        let reached = create_test_goal(&db, "user1", "Laptop", 500.0, Some(date(2024, 5, 20))).await?;
        let mut active_model: crate::entities::goal::ActiveModel = reached.into();
        active_model.current_amount = Set(500.0);
        active_model.update(&db).await?;

        let report = auto_generate_reminders_at(&db, "user1", at(2024, 5, 1, 10, 0)).await?;
        assert_eq!(report.goals, 0);
        assert_eq!(Reminder::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_auto_generate_budget_threshold() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_budget(&db, "user1", "Food", 5, 2024, 100.0).await?;
        create_test_budget(&db, "user1", "Fun", 5, 2024, 100.0).await?;
        add_spending(&db, "user1", "Food", date(2024, 5, 3), 80.0).await?;
        add_spending(&db, "user1", "Fun", date(2024, 5, 3), 79.0).await?;

        let now = at(2024, 5, 10, 10, 0);
        let report = auto_generate_reminders_at(&db, "user1", now).await?;
        assert_eq!(report.budgets, 1);

        let reminders = Reminder::find().all(&db).await?;
        assert_eq!(reminders[0].title, "Budget Alert: Food");
        assert_eq!(reminders[0].reminder_date, now);

        let report = auto_generate_reminders_at(&db, "user1", at(2024, 5, 11, 10, 0)).await?;
        assert_eq!(report.budgets, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_sent_budget_alert_allows_new_one() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_budget(&db, "user1", "Food", 5, 2024, 100.0).await?;
        add_spending(&db, "user1", "Food", date(2024, 5, 3), 90.0).await?;

        auto_generate_reminders_at(&db, "user1", at(2024, 5, 10, 10, 0)).await?;
        process_due_reminders_at(&db, at(2024, 5, 10, 11, 0)).await?;

        let report = auto_generate_reminders_at(&db, "user1", at(2024, 5, 12, 10, 0)).await?;
        assert_eq!(report.budgets, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upcoming_ordering_and_urgency() -> Result<()> {
        let db = setup_test_db().await?;
        let now = at(2024, 3, 10, 12, 0);
        create_reminder(&db, "user1", custom("In three days", at(2024, 3, 13, 12, 0), None)).await?;
        create_reminder(&db, "user1", custom("Overdue", at(2024, 3, 9, 12, 0), None)).await?;
        create_reminder(&db, "user1", custom("Tomorrow", at(2024, 3, 11, 10, 0), None)).await?;
        create_reminder(&db, "user1", custom("Next month", at(2024, 4, 10, 12, 0), None)).await?;
        create_reminder(&db, "user2", custom("Someone else", at(2024, 3, 11, 10, 0), None)).await?;

        let upcoming = upcoming_reminders_at(&db, "user1", 7, now).await?;
        let summary: Vec<(&str, bool)> = upcoming
            .iter()
            .map(|u| (u.reminder.title.as_str(), u.is_urgent))
            .collect();
        assert_eq!(
            summary,
            vec![("Overdue", true), ("Tomorrow", true), ("In three days", false)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_upcoming_huge_window_is_unbounded() -> Result<()> {
        let db = setup_test_db().await?;
        let now = at(2024, 3, 1, 0, 0);
        create_reminder(&db, "user1", custom("Soon", at(2024, 3, 1, 12, 0), None)).await?;
        create_reminder(&db, "user1", custom("Far", at(2090, 1, 1, 0, 0), None)).await?;

        let upcoming = upcoming_reminders_at(&db, "user1", 200_000_000, now).await?;
        assert_eq!(upcoming.len(), 2);
        assert!(upcoming[0].is_urgent);
        assert!(!upcoming[1].is_urgent);

        let upcoming = upcoming_reminders_at(&db, "user1", u32::MAX, now).await?;
        assert_eq!(upcoming.len(), 2);
        Ok(())
    }
}
