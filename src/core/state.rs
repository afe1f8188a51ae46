//! Last-run bookkeeping for the background triggers.
//!
//! Each trigger records the reference day of its last committed tick in the
//! `system_state` table. The write happens on the tick's own connection, so it commits
//! or rolls back together with the tick.

use crate::{
    entities::{SystemState, system_state},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{Set, prelude::*};

/// Key for the recurring transaction trigger
pub const LAST_RECURRING_RUN_KEY: &str = "last_recurring_run";
/// Key for the subscription trigger
pub const LAST_SUBSCRIPTION_RUN_KEY: &str = "last_subscription_run";
/// Key for the reminder trigger
pub const LAST_REMINDER_RUN_KEY: &str = "last_reminder_run";

/// Retrieves the day recorded under `key`.
///
/// # Returns
/// * `Ok(Some(date))` - Last run date if it exists
/// * `Ok(None)` - No run recorded yet
pub async fn get_last_run<C>(db: &C, key: &str) -> Result<Option<NaiveDate>>
where
    C: ConnectionTrait,
{
    let state = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    match state {
        Some(s) => NaiveDate::parse_from_str(&s.value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::Config {
                message: format!("Failed to parse {key} date: {e}"),
            }),
        None => Ok(None),
    }
}

/// Records `date` under `key`, inserting the row on first use.
pub async fn record_run<C>(db: &C, key: &str, date: NaiveDate) -> Result<()>
where
    C: ConnectionTrait,
{
    let date_str = date.format("%Y-%m-%d").to_string();
    let now = Utc::now().naive_utc();

    let existing = SystemState::find()
        .filter(system_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: system_state::ActiveModel = state.into();
        active_model.value = Set(date_str);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = system_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(date_str),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    Ok(())
}
