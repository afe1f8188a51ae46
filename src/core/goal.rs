//! Goal business logic - savings targets and contributions.

use crate::{
    entities::{Goal, GoalStatus, goal},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Creates an active goal with nothing saved yet.
pub async fn create_goal(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    target_amount: f64,
    target_date: Option<NaiveDate>,
) -> Result<goal::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Goal name cannot be empty".to_string(),
        });
    }

    if !target_amount.is_finite() || target_amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: target_amount,
        });
    }

    let now = Utc::now();
    let goal = goal::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.trim().to_string()),
        target_amount: Set(target_amount),
        current_amount: Set(0.0),
        target_date: Set(target_date),
        status: Set(GoalStatus::Active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    goal.insert(db).await.map_err(Into::into)
}

/// Adds a contribution to a goal, completing it once the target is reached.
///
/// # Returns
/// * `Ok(Some(goal))` - The updated goal
/// * `Ok(None)` - No goal with that id
pub async fn contribute_to_goal(
    db: &DatabaseConnection,
    goal_id: i64,
    amount: f64,
) -> Result<Option<goal::Model>> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }

    let Some(existing) = Goal::find_by_id(goal_id).one(db).await? else {
        return Ok(None);
    };

    let current_amount = existing.current_amount + amount;
    let reached = current_amount >= existing.target_amount;
    let status = if reached && existing.status == GoalStatus::Active {
        GoalStatus::Completed
    } else {
        existing.status
    };

    let mut active_model: goal::ActiveModel = existing.into();
    active_model.current_amount = Set(current_amount);
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now());

    Ok(Some(active_model.update(db).await?))
}

/// Active goals for an owner, soonest deadline first (goals without a deadline last).
pub async fn get_active_goals<C>(db: &C, user_id: &str) -> Result<Vec<goal::Model>>
where
    C: ConnectionTrait,
{
    let mut goals = Goal::find()
        .filter(goal::Column::UserId.eq(user_id))
        .filter(goal::Column::Status.eq(GoalStatus::Active))
        .order_by_asc(goal::Column::Id)
        .all(db)
        .await?;

    goals.sort_by_key(|g| (g.target_date.is_none(), g.target_date));
    Ok(goals)
}

/// Number of completed goals for an owner.
pub async fn count_completed_goals<C>(db: &C, user_id: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    Goal::find()
        .filter(goal::Column::UserId.eq(user_id))
        .filter(goal::Column::Status.eq(GoalStatus::Completed))
        .count(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_goal_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_goal(&db, "user1", "", 100.0, None).await;
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = create_goal(&db, "user1", "Trip", 0.0, None).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_contribute_completes_goal() -> Result<()> {
        let db = setup_test_db().await?;
        let goal = create_goal(&db, "user1", "Emergency Fund", 100.0, None).await?;

        let goal = contribute_to_goal(&db, goal.id, 60.0).await?.unwrap();
        assert_eq!(goal.status, GoalStatus::Active);
        assert_eq!(goal.progress_percentage(), 60.0);

        let goal = contribute_to_goal(&db, goal.id, 40.0).await?.unwrap();
        assert_eq!(goal.status, GoalStatus::Completed);
        assert_eq!(goal.current_amount, 100.0);

        assert_eq!(count_completed_goals(&db, "user1").await?, 1);
        assert!(get_active_goals(&db, "user1").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_contribute_to_missing_goal() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(contribute_to_goal(&db, 42, 10.0).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_active_goals_ordered_by_deadline() -> Result<()> {
        let db = setup_test_db().await?;
        create_goal(&db, "user1", "Someday", 100.0, None).await?;
        create_goal(&db, "user1", "Later", 100.0, Some(date(2024, 12, 1))).await?;
        create_goal(&db, "user1", "Soon", 100.0, Some(date(2024, 6, 1))).await?;
        create_goal(&db, "user2", "Other", 100.0, Some(date(2024, 1, 1))).await?;

        let names: Vec<String> = get_active_goals(&db, "user1")
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["Soon", "Later", "Someday"]);
        Ok(())
    }
}
