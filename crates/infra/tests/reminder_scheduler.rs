//! Reminder scheduler timing tests on a paused tokio clock.

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use notifier_core::Clock;
use notifier_domain::{Event, NotifierError, Reminder, ReminderEvent};
use notifier_infra::observability::metrics::PollMetrics;
use notifier_infra::scheduling::{ReminderScheduler, ReminderSchedulerConfig, SchedulerError};
use support::{base_time, event_at, ScriptedCalendar, TestClock};
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn config(poll_secs: u64, backoff_secs: u64) -> ReminderSchedulerConfig {
    ReminderSchedulerConfig {
        poll_interval: Duration::from_secs(poll_secs),
        exhausted_backoff: Duration::from_secs(backoff_secs),
        fetch_timeout: Duration::from_secs(5),
        join_timeout: Duration::from_secs(5),
    }
}

fn scheduler(
    calendar: Arc<ScriptedCalendar>,
    clock: Arc<TestClock>,
    config: ReminderSchedulerConfig,
) -> (ReminderScheduler, UnboundedReceiver<Event>, Arc<PollMetrics>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let metrics = Arc::new(PollMetrics::new());
    let scheduler = ReminderScheduler::new(calendar, clock, tx, config, Arc::clone(&metrics));
    (scheduler, rx, metrics)
}

async fn next_reminder(rx: &mut UnboundedReceiver<Event>) -> ReminderEvent {
    match rx.recv().await {
        Some(Event::CalendarReminder(reminder)) => reminder,
        other => panic!("expected a calendar reminder, got {other:?}"),
    }
}

fn minutes(n: i64) -> chrono::Duration {
    chrono::Duration::minutes(n)
}

#[tokio::test(start_paused = true)]
async fn fires_both_reminders_at_their_deadlines() {
    let clock = TestClock::new();
    let calendar = ScriptedCalendar::new(vec![Ok(vec![event_at(10, "standup")])]);
    let (mut scheduler, mut rx, metrics) = scheduler(calendar, Arc::clone(&clock), config(3600, 60));

    scheduler.start().await.unwrap();

    let first = next_reminder(&mut rx).await;
    assert_eq!(first.reminder, Reminder::FiveMinutesBefore);
    assert_eq!(first.event.summary, "standup");
    assert_eq!(clock.now(), base_time() + minutes(5));

    let second = next_reminder(&mut rx).await;
    assert_eq!(second.reminder, Reminder::AtStartTime);
    assert_eq!(clock.now(), base_time() + minutes(10));

    assert_eq!(metrics.events_emitted(), 2);
    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn picks_start_time_when_five_minute_mark_already_passed() {
    let clock = TestClock::new();
    let calendar = ScriptedCalendar::new(vec![Ok(vec![
        event_at(30, "later"),
        event_at(4, "soon"),
    ])]);
    let (mut scheduler, mut rx, _) = scheduler(calendar, Arc::clone(&clock), config(3600, 60));

    scheduler.start().await.unwrap();

    let reminder = next_reminder(&mut rx).await;
    assert_eq!(reminder.reminder, Reminder::AtStartTime);
    assert_eq!(reminder.event.summary, "soon");
    assert_eq!(clock.now(), base_time() + minutes(4));

    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn fresh_snapshot_preempts_a_later_wait() {
    let clock = TestClock::new();
    let calendar = ScriptedCalendar::new(vec![
        Ok(vec![event_at(60, "review")]),
        Ok(vec![event_at(60, "review"), event_at(20, "incident")]),
    ]);
    let (mut scheduler, mut rx, _) = scheduler(calendar, Arc::clone(&clock), config(600, 60));

    scheduler.start().await.unwrap();

    let reminder = next_reminder(&mut rx).await;
    assert_eq!(reminder.event.summary, "incident");
    assert_eq!(reminder.reminder, Reminder::FiveMinutesBefore);
    assert_eq!(clock.now(), base_time() + minutes(15));

    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn cancelled_wait_never_emits() {
    let clock = TestClock::new();
    let calendar = ScriptedCalendar::new(vec![Ok(vec![event_at(30, "cancelled meeting")]), Ok(vec![])]);
    let (mut scheduler, mut rx, _) = scheduler(calendar, clock, config(600, 60));

    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_secs(2 * 3600)).await;

    assert!(rx.try_recv().is_err(), "no reminder for a removed event");
    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn exhausted_snapshot_repolls_after_backoff() {
    let clock = TestClock::new();
    let calendar = ScriptedCalendar::new(vec![Ok(vec![]), Ok(vec![event_at(3, "quick sync")])]);
    let (mut scheduler, mut rx, _) =
        scheduler(Arc::clone(&calendar), Arc::clone(&clock), config(600, 60));

    scheduler.start().await.unwrap();

    let reminder = next_reminder(&mut rx).await;
    assert_eq!(reminder.event.summary, "quick sync");
    assert_eq!(reminder.reminder, Reminder::AtStartTime);
    assert_eq!(clock.now(), base_time() + minutes(3));
    // Initial fetch, the backoff re-poll at one minute, and again at two.
    assert!(calendar.calls() >= 2);

    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_previous_snapshot() {
    let clock = TestClock::new();
    let calendar = ScriptedCalendar::new(vec![
        Ok(vec![event_at(20, "planning")]),
        Err(NotifierError::Fetch("HTTP 429 Too Many Requests".into())),
    ]);
    let (mut scheduler, mut rx, metrics) =
        scheduler(calendar, Arc::clone(&clock), config(600, 60));

    scheduler.start().await.unwrap();

    let first = next_reminder(&mut rx).await;
    assert_eq!(first.reminder, Reminder::FiveMinutesBefore);
    assert_eq!(clock.now(), base_time() + minutes(15));

    let second = next_reminder(&mut rx).await;
    assert_eq!(second.reminder, Reminder::AtStartTime);
    assert_eq!(second.event.summary, "planning");
    assert_eq!(metrics.error_count(), 1);

    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_initial_fetch_starts_empty() {
    let clock = TestClock::new();
    let calendar = ScriptedCalendar::new(vec![
        Err(NotifierError::Fetch("connection refused".into())),
        Ok(vec![event_at(30, "retro")]),
    ]);
    let (mut scheduler, mut rx, _) = scheduler(calendar, Arc::clone(&clock), config(600, 60));

    scheduler.start().await.unwrap();

    let reminder = next_reminder(&mut rx).await;
    assert_eq!(reminder.event.summary, "retro");
    assert_eq!(clock.now(), base_time() + minutes(25));

    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn lifecycle_rejects_double_start_and_stop() {
    let calendar = ScriptedCalendar::new(vec![Ok(vec![])]);
    let (mut scheduler, _rx, _) = scheduler(calendar, TestClock::new(), config(600, 60));

    scheduler.start().await.unwrap();
    assert!(scheduler.is_running());
    assert!(matches!(scheduler.start().await, Err(SchedulerError::AlreadyRunning)));

    scheduler.stop().await.unwrap();
    assert!(!scheduler.is_running());
    assert!(matches!(scheduler.stop().await, Err(SchedulerError::NotRunning)));

    // Restart after stop
    scheduler.start().await.unwrap();
    scheduler.stop().await.unwrap();
}
