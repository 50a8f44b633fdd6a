//! Calendar reminder scheduler.
//!
//! Two futures race inside one task on every cycle:
//!
//! - **wait**: sleep until the next reminder deadline of the current snapshot,
//!   then emit [`Event::CalendarReminder`];
//! - **poll**: sleep until the next poll is due, then fetch a fresh snapshot.
//!
//! The poll future persists across cycles and is only replaced once it
//! completes, so a reminder firing never postpones the next fetch. The wait
//! future is rebuilt on every cycle; when the poll wins, the wait is dropped
//! before it can emit anything and is recomputed from the new snapshot.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use notifier_core::SystemClock;
//! use notifier_infra::observability::metrics::PollMetrics;
//! use notifier_infra::scheduling::{ReminderScheduler, ReminderSchedulerConfig, SchedulerResult};
//!
//! # async fn example(source: Arc<dyn notifier_core::CalendarSource>) -> SchedulerResult<()> {
//! let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut scheduler = ReminderScheduler::new(
//!     source,
//!     Arc::new(SystemClock),
//!     tx,
//!     ReminderSchedulerConfig::default(),
//!     Arc::new(PollMetrics::new()),
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use notifier_core::{next_deadline, CalendarSource, Clock};
use notifier_domain::config::CalendarConfig;
use notifier_domain::{CalendarEvent, Event};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::observability::log_metric;
use crate::observability::metrics::PollMetrics;
use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// Delay between two regular snapshot fetches.
    pub poll_interval: Duration,
    /// Shortened re-poll delay used while no future reminder exists.
    pub exhausted_backoff: Duration,
    /// Timeout applied to a single fetch.
    pub fetch_timeout: Duration,
    /// Timeout for awaiting the task join handle on stop.
    pub join_timeout: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self::from(&CalendarConfig::default())
    }
}

impl From<&CalendarConfig> for ReminderSchedulerConfig {
    fn from(config: &CalendarConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            exhausted_backoff: config.exhausted_backoff(),
            fetch_timeout: config.fetch_timeout(),
            join_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
struct LoopContext {
    source: Arc<dyn CalendarSource>,
    clock: Arc<dyn Clock>,
    events: UnboundedSender<Event>,
    config: ReminderSchedulerConfig,
    metrics: Arc<PollMetrics>,
}

/// Emits calendar reminders onto the dispatcher queue.
pub struct ReminderScheduler {
    context: LoopContext,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new(
        source: Arc<dyn CalendarSource>,
        clock: Arc<dyn Clock>,
        events: UnboundedSender<Event>,
        config: ReminderSchedulerConfig,
        metrics: Arc<PollMetrics>,
    ) -> Self {
        Self {
            context: LoopContext { source, clock, events, config, metrics },
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Spawn the scheduling task.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::AlreadyRunning`] if the task is alive.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // New token so the scheduler can be restarted after stop
        self.cancellation = CancellationToken::new();

        let context = self.context.clone();
        let cancel = self.cancellation.clone();
        self.task_handle = Some(tokio::spawn(async move {
            Self::run_loop(context, cancel).await;
        }));

        info!(
            poll_interval_secs = self.context.config.poll_interval.as_secs(),
            "Reminder scheduler started"
        );
        Ok(())
    }

    /// Cancel the task and wait for it to finish.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotRunning`] when never started, [`SchedulerError::Timeout`]
    /// when the task does not finish within the join timeout.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        let Some(handle) = self.task_handle.take() else {
            return Err(SchedulerError::NotRunning);
        };

        self.cancellation.cancel();

        let join_timeout = self.context.config.join_timeout;
        tokio::time::timeout(join_timeout, handle)
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;

        info!("Reminder scheduler stopped");
        Ok(())
    }

    /// True while the scheduling task is alive.
    pub fn is_running(&self) -> bool {
        self.task_handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    async fn run_loop(context: LoopContext, cancel: CancellationToken) {
        let LoopContext { source, clock, events, config, metrics } = context;

        let mut snapshot = fetch_snapshot(&*source, config.fetch_timeout, &metrics)
            .await
            .unwrap_or_default();
        let mut last_fired: Option<DateTime<Utc>> = None;

        let mut poll_due = Instant::now() + config.poll_interval;
        let poll = poll_at(
            Arc::clone(&source),
            poll_due,
            config.fetch_timeout,
            Arc::clone(&metrics),
        );
        tokio::pin!(poll);

        loop {
            let deadline = match next_deadline(&snapshot, evaluation_time(clock.now(), last_fired)) {
                Ok(deadline) => {
                    debug!(
                        at = %deadline.at,
                        reminder = %deadline.reminder,
                        summary = %deadline.event.summary,
                        "Next reminder scheduled"
                    );
                    Some(deadline)
                }
                Err(_) => {
                    let backoff_due = Instant::now() + config.exhausted_backoff;
                    if backoff_due < poll_due {
                        info!(
                            events = snapshot.len(),
                            backoff_secs = config.exhausted_backoff.as_secs(),
                            "No future reminder in snapshot; re-polling early"
                        );
                        poll_due = backoff_due;
                        poll.set(poll_at(
                            Arc::clone(&source),
                            poll_due,
                            config.fetch_timeout,
                            Arc::clone(&metrics),
                        ));
                    }
                    None
                }
            };

            let wait = deadline
                .as_ref()
                .map(|deadline| (deadline.at - clock.now()).to_std().unwrap_or(Duration::ZERO));

            tokio::select! {
                // A deadline due at the same instant as a poll fires first.
                biased;

                () = cancel.cancelled() => {
                    debug!("Reminder loop cancelled");
                    break;
                }
                () = sleep_for(wait) => {
                    let Some(deadline) = deadline else { continue };
                    let at = deadline.at;
                    info!(
                        at = %at,
                        reminder = %deadline.reminder,
                        summary = %deadline.event.summary,
                        "Reminder due"
                    );
                    if events.send(Event::CalendarReminder(deadline.into_reminder_event())).is_err() {
                        info!("Event queue closed; reminder loop exiting");
                        break;
                    }
                    log_metric(metrics.record_events(1), "scheduler.reminder.emitted");
                    last_fired = Some(at);
                }
                fetched = &mut poll => {
                    if let Some(fresh) = fetched {
                        snapshot = fresh;
                    }
                    poll_due = Instant::now() + config.poll_interval;
                    poll.set(poll_at(
                        Arc::clone(&source),
                        poll_due,
                        config.fetch_timeout,
                        Arc::clone(&metrics),
                    ));
                }
            }
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ReminderScheduler dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}

/// A reminder that already fired is never eligible again, even when the
/// wall clock lags the timer that fired it.
fn evaluation_time(now: DateTime<Utc>, last_fired: Option<DateTime<Utc>>) -> DateTime<Utc> {
    last_fired.map_or(now, |fired| fired.max(now))
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}

async fn poll_at(
    source: Arc<dyn CalendarSource>,
    due: Instant,
    timeout: Duration,
    metrics: Arc<PollMetrics>,
) -> Option<Vec<CalendarEvent>> {
    tokio::time::sleep_until(due).await;
    fetch_snapshot(&*source, timeout, &metrics).await
}

/// Fetch one snapshot; failures are logged and yield `None`.
async fn fetch_snapshot(
    source: &dyn CalendarSource,
    timeout: Duration,
    metrics: &PollMetrics,
) -> Option<Vec<CalendarEvent>> {
    let started = std::time::Instant::now();
    let result = tokio::time::timeout(timeout, source.fetch_upcoming_events()).await;
    log_metric(metrics.record_fetch_time(started.elapsed()), "scheduler.reminder.fetch_duration");

    match result {
        Ok(Ok(events)) => {
            debug!(count = events.len(), "Calendar snapshot fetched");
            Some(events)
        }
        Ok(Err(err)) => {
            log_metric(metrics.record_error(), "scheduler.reminder.fetch_error");
            warn!(error = %err, "Calendar fetch failed; keeping previous snapshot");
            None
        }
        Err(_) => {
            log_metric(metrics.record_timeout(), "scheduler.reminder.fetch_timeout");
            warn!(timeout_secs = timeout.as_secs(), "Calendar fetch timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn evaluation_time_never_goes_back_before_last_fired() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let fired = now + chrono::Duration::seconds(1);

        assert_eq!(evaluation_time(now, None), now);
        assert_eq!(evaluation_time(now, Some(fired)), fired);
        assert_eq!(evaluation_time(fired, Some(now)), fired);
    }

    #[test]
    fn config_caps_backoff_at_poll_interval() {
        let calendar = CalendarConfig {
            poll_interval_seconds: 20,
            exhausted_backoff_seconds: 60,
            ..CalendarConfig::default()
        };
        let config = ReminderSchedulerConfig::from(&calendar);
        assert_eq!(config.exhausted_backoff, Duration::from_secs(20));
        assert_eq!(config.poll_interval, Duration::from_secs(20));
    }
}
