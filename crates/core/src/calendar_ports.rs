//! Calendar collaborator port interfaces

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notifier_domain::{CalendarEvent, Result};

/// Source of upcoming calendar events.
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Fetch the full snapshot of future events that have a start time.
    ///
    /// Failures surface as [`notifier_domain::NotifierError::Fetch`].
    async fn fetch_upcoming_events(&self) -> Result<Vec<CalendarEvent>>;
}

/// Wall clock used to evaluate reminder deadlines.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
