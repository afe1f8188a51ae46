//! Background task scheduler for the recurring engines.
//!
//! Every registered task runs on its own tokio task with its own timeline, so a slow or
//! failing trigger never delays another one. Within one trigger a tick always finishes
//! before the next one fires. Each tick runs in a freshly spawned task, which turns both
//! errors and panics into log lines instead of stopping the loop.
//!
//! The production triggers registered by [`start_background_jobs`]:
//!
//! - recurring transactions, daily just after midnight UTC
//! - subscriptions, daily just after midnight UTC
//! - due reminders, every `reminder_interval_minutes`, starting immediately
//!
//! Daily triggers re-read the wall clock before every sleep, so a clock correction
//! cannot shift them onto the wrong calendar day.

use crate::{
    config::SchedulerSettings,
    core::{recurrence, reminder},
    errors::{Error, Result},
};
use chrono::{DateTime, Days, NaiveTime, Utc};
use sea_orm::DatabaseConnection;
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at, sleep},
};
use tracing::{debug, error, info, warn};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Slack after midnight before a daily tick fires
const MIDNIGHT_GUARD: Duration = Duration::from_secs(60);

/// Registry of running periodic tasks
#[derive(Debug, Default)]
pub struct Scheduler {
    handles: Vec<(String, JoinHandle<()>)>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `task` on a new periodic timeline.
    ///
    /// The first tick fires after `initial_delay`, later ones every `period`. Ticks that
    /// would have fired while a previous tick was still running are skipped.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// `Config` if `period` is zero.
    pub fn register<F, Fut>(
        &mut self,
        name: &str,
        initial_delay: Duration,
        period: Duration,
        task: F,
    ) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        if period.is_zero() {
            return Err(Error::Config {
                message: format!("Task '{name}' needs a non-zero period"),
            });
        }

        info!(
            "Scheduling '{}': first run in {:?}, then every {:?}",
            name, initial_delay, period
        );

        let handle = tokio::spawn(run_periodic(name.to_string(), initial_delay, period, task));
        self.handles.push((name.to_string(), handle));
        Ok(())
    }

    /// Starts `task` once a day, shortly after midnight UTC.
    ///
    /// Must be called from within a tokio runtime.
    pub fn register_daily<F, Fut>(&mut self, name: &str, task: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        info!(
            "Scheduling '{}' daily, first run in {:?}",
            name,
            next_daily_delay(Utc::now())
        );

        let handle = tokio::spawn(run_daily(name.to_string(), task));
        self.handles.push((name.to_string(), handle));
    }

    /// Names of the registered tasks, in registration order.
    #[must_use]
    pub fn task_names(&self) -> Vec<&str> {
        self.handles.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Stops every registered timeline. A tick already in flight is not interrupted.
    pub fn shutdown(self) {
        for (name, handle) in self.handles {
            debug!("Stopping '{}'", name);
            handle.abort();
        }
        info!("Scheduler stopped");
    }
}

async fn run_periodic<F, Fut>(name: String, initial_delay: Duration, period: Duration, task: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let mut ticker = interval_at(Instant::now() + initial_delay, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        run_tick(&name, &task).await;
    }
}

async fn run_daily<F, Fut>(name: String, task: F)
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    loop {
        sleep(next_daily_delay(Utc::now())).await;
        run_tick(&name, &task).await;
    }
}

async fn run_tick<F, Fut>(name: &str, task: &F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    debug!("Running '{}'", name);

    match tokio::spawn(task()).await {
        Ok(Ok(())) => debug!("'{}' finished", name),
        Ok(Err(e)) => error!("Scheduled task '{}' failed: {}", name, e),
        Err(e) if e.is_panic() => error!("Scheduled task '{}' panicked", name),
        Err(e) => warn!("Scheduled task '{}' was cancelled: {}", name, e),
    }
}

/// Time from `now` until the next midnight UTC. Exactly at midnight this is a full day.
#[must_use]
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .map(|tomorrow| tomorrow.and_time(NaiveTime::MIN).and_utc())
        .and_then(|midnight| (midnight - now).to_std().ok())
        .unwrap_or(DAY)
}

/// Delay before the next daily tick: the next midnight UTC plus a minute of slack.
#[must_use]
pub fn next_daily_delay(now: DateTime<Utc>) -> Duration {
    until_next_midnight(now) + MIDNIGHT_GUARD
}

/// Registers the enabled production triggers against `db`.
///
/// # Errors
/// `Config` if the reminder interval is zero or out of range.
pub fn start_background_jobs(db: Arc<DatabaseConnection>, settings: &SchedulerSettings) -> Result<Scheduler> {
    let mut scheduler = Scheduler::new();

    if settings.recurring_enabled {
        let db = Arc::clone(&db);
        scheduler.register_daily("recurring-transactions", move || {
            let db = Arc::clone(&db);
            async move { recurrence::run_recurring_tick(&db).await.map(|_| ()) }
        });
    }

    if settings.subscriptions_enabled {
        let db = Arc::clone(&db);
        scheduler.register_daily("subscriptions", move || {
            let db = Arc::clone(&db);
            async move { recurrence::run_subscription_tick(&db).await.map(|_| ()) }
        });
    }

    if settings.reminders_enabled {
        let period = settings.reminder_period()?;
        scheduler.register("reminders", Duration::ZERO, period, move || {
            let db = Arc::clone(&db);
            async move { reminder::process_due_reminders(&db).await.map(|_| ()) }
        })?;
    }

    info!("Started {} background jobs", scheduler.task_names().len());
    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::test_utils::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<Result<()>> + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() -> Result<()> {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register("count", Duration::ZERO, Duration::from_secs(10), counting(&runs))?;

        sleep(Duration::from_secs(35)).await;
        // t = 0, 10, 20, 30
        assert_eq!(runs.load(Ordering::SeqCst), 4);

        scheduler.shutdown();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay() -> Result<()> {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register("delayed", Duration::from_secs(60), Duration::from_secs(10), counting(&runs))?;

        sleep(Duration::from_secs(59)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        scheduler.shutdown();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_task_keeps_running() -> Result<()> {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut scheduler = Scheduler::new();
        scheduler.register("failing", Duration::ZERO, Duration::from_secs(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Err::<(), Error>(Error::Config {
                message: "boom".to_string(),
            }))
        })?;

        sleep(Duration::from_secs(25)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        scheduler.shutdown();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_task_keeps_running() -> Result<()> {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut scheduler = Scheduler::new();
        scheduler.register("panicking", Duration::ZERO, Duration::from_secs(10), move || {
            let run = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if run == 0 {
                    panic!("first tick blows up");
                }
                Ok::<(), Error>(())
            }
        })?;

        sleep(Duration::from_secs(25)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);

        scheduler.shutdown();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_of_one_task_never_overlap() -> Result<()> {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let runs = Arc::new(AtomicUsize::new(0));

        let (current, max, count) = (Arc::clone(&in_flight), Arc::clone(&max_in_flight), Arc::clone(&runs));
        let mut scheduler = Scheduler::new();
        scheduler.register("slow", Duration::ZERO, Duration::from_secs(10), move || {
            let (current, max, count) = (Arc::clone(&current), Arc::clone(&max), Arc::clone(&count));
            async move {
                let now_running = current.fetch_add(1, Ordering::SeqCst) + 1;
                max.fetch_max(now_running, Ordering::SeqCst);
                sleep(Duration::from_secs(25)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                count.fetch_add(1, Ordering::SeqCst);
                Ok::<(), Error>(())
            }
        })?;

        sleep(Duration::from_secs(100)).await;
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert!(runs.load(Ordering::SeqCst) >= 2);

        scheduler.shutdown();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_tasks_are_independent() -> Result<()> {
        let fast = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register("stuck", Duration::ZERO, Duration::from_secs(10), || async {
            sleep(Duration::from_secs(3600)).await;
            Ok::<(), Error>(())
        })?;
        scheduler.register("fast", Duration::ZERO, Duration::from_secs(10), counting(&fast))?;

        sleep(Duration::from_secs(45)).await;
        assert_eq!(fast.load(Ordering::SeqCst), 5);
        assert_eq!(scheduler.task_names(), vec!["stuck", "fast"]);

        scheduler.shutdown();
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_ticks() -> Result<()> {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register("count", Duration::ZERO, Duration::from_secs(10), counting(&runs))?;

        sleep(Duration::from_secs(15)).await;
        scheduler.shutdown();
        let before = runs.load(Ordering::SeqCst);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(runs.load(Ordering::SeqCst), before);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_period_rejected() {
        let mut scheduler = Scheduler::new();
        let result = scheduler.register("never", Duration::ZERO, Duration::ZERO, || async { Ok::<(), Error>(()) });
        assert!(matches!(result, Err(Error::Config { .. })));
        assert!(scheduler.task_names().is_empty());
    }

    #[test]
    fn test_until_next_midnight() {
        assert_eq!(until_next_midnight(at(2024, 3, 10, 23, 0)), Duration::from_secs(3600));
        assert_eq!(until_next_midnight(at(2024, 3, 10, 0, 0)), DAY);
        assert_eq!(until_next_midnight(at(2024, 12, 31, 12, 30)), Duration::from_secs(11 * 3600 + 1800));
    }

    #[test]
    fn test_next_daily_delay_lands_after_midnight() {
        for now in [at(2024, 3, 10, 23, 59), at(2024, 3, 10, 0, 0), at(2024, 12, 31, 12, 30)] {
            let fires = now + chrono::Duration::from_std(next_daily_delay(now)).unwrap();
            assert_eq!(fires.date_naive(), now.date_naive().succ_opt().unwrap());
            assert_eq!(fires.time(), NaiveTime::from_hms_opt(0, 1, 0).unwrap());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_daily_task_runs_within_a_day() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register_daily("daily", counting(&runs));

        sleep(DAY + MIDNIGHT_GUARD + Duration::from_secs(1)).await;
        assert!(runs.load(Ordering::SeqCst) >= 1);
        assert_eq!(scheduler.task_names(), vec!["daily"]);

        scheduler.shutdown();
    }

    #[tokio::test]
    async fn test_start_background_jobs_rejects_bad_interval() -> Result<()> {
        let db = Arc::new(setup_test_db().await?);
        let settings = SchedulerSettings {
            reminder_interval_minutes: u64::MAX,
            ..SchedulerSettings::default()
        };

        assert!(matches!(start_background_jobs(db, &settings), Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_start_background_jobs_respects_settings() -> Result<()> {
        let db = Arc::new(setup_test_db().await?);
        let settings = SchedulerSettings {
            recurring_enabled: true,
            subscriptions_enabled: false,
            reminders_enabled: true,
            reminder_interval_minutes: 60,
        };

        let scheduler = start_background_jobs(db, &settings)?;
        assert_eq!(scheduler.task_names(), vec!["recurring-transactions", "reminders"]);
        scheduler.shutdown();
        Ok(())
    }
}
