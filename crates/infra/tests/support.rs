//! Shared fakes for infra integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use notifier_core::{CalendarSource, Clock, Command, PanelLink, PullSource};
use notifier_domain::{CalendarEvent, NotifierError, Pull, Result};
use parking_lot::Mutex;
use tokio::time::Instant;

/// Fixed UTC base every test timeline starts from.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
}

/// Wall clock that follows tokio's (paused) clock from [`base_time`].
pub struct TestClock {
    base: DateTime<Utc>,
    origin: Instant,
}

impl TestClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { base: base_time(), origin: Instant::now() })
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = Instant::now() - self.origin;
        self.base + chrono::Duration::from_std(elapsed).unwrap()
    }
}

pub fn event_at(minutes: i64, summary: &str) -> CalendarEvent {
    CalendarEvent::new(base_time() + chrono::Duration::minutes(minutes), summary)
}

/// Calendar source replaying scripted snapshots; the last one repeats.
pub struct ScriptedCalendar {
    snapshots: Mutex<VecDeque<Result<Vec<CalendarEvent>>>>,
    last: Mutex<Vec<CalendarEvent>>,
    calls: Mutex<usize>,
}

impl ScriptedCalendar {
    pub fn new(snapshots: Vec<Result<Vec<CalendarEvent>>>) -> Arc<Self> {
        Arc::new(Self {
            snapshots: Mutex::new(snapshots.into()),
            last: Mutex::new(Vec::new()),
            calls: Mutex::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl CalendarSource for ScriptedCalendar {
    async fn fetch_upcoming_events(&self) -> Result<Vec<CalendarEvent>> {
        *self.calls.lock() += 1;
        match self.snapshots.lock().pop_front() {
            Some(Ok(events)) => {
                *self.last.lock() = events.clone();
                Ok(events)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.last.lock().clone()),
        }
    }
}

/// Pull source replaying scripted snapshots; the last one repeats.
pub struct ScriptedPulls {
    snapshots: Mutex<VecDeque<Result<Vec<Pull>>>>,
    last: Mutex<Vec<Pull>>,
}

impl ScriptedPulls {
    pub fn new(snapshots: Vec<Result<Vec<Pull>>>) -> Arc<Self> {
        Arc::new(Self { snapshots: Mutex::new(snapshots.into()), last: Mutex::new(Vec::new()) })
    }
}

#[async_trait]
impl PullSource for ScriptedPulls {
    async fn fetch_open_pulls(&self) -> Result<Vec<Pull>> {
        match self.snapshots.lock().pop_front() {
            Some(Ok(pulls)) => {
                *self.last.lock() = pulls.clone();
                Ok(pulls)
            }
            Some(Err(err)) => Err(err),
            None => Ok(self.last.lock().clone()),
        }
    }
}

/// Panel that records every command and answers from a script.
#[derive(Default)]
pub struct RecordingPanel {
    sent: Mutex<Vec<Command>>,
    failures: Mutex<VecDeque<Option<NotifierError>>>,
}

impl RecordingPanel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue outcomes for the next sends; `None` means success.
    pub fn script(&self, outcomes: Vec<Option<NotifierError>>) {
        self.failures.lock().extend(outcomes);
    }

    pub fn sent(&self) -> Vec<Command> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl PanelLink for RecordingPanel {
    async fn send(&self, command: Command) -> Result<String> {
        self.sent.lock().push(command);
        match self.failures.lock().pop_front().flatten() {
            Some(err) => Err(err),
            None => Ok("OK".to_string()),
        }
    }
}
