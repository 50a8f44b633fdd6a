//! Calendar snapshot items and reminders

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One upcoming calendar event, re-fetched wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub summary: String,
    /// Provider payload, kept opaque.
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl CalendarEvent {
    pub fn new(start: DateTime<Utc>, summary: impl Into<String>) -> Self {
        Self { start, summary: summary.into(), raw: Map::new() }
    }
}

/// Fixed offset before an event's start at which a notification fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reminder {
    FiveMinutesBefore,
    AtStartTime,
}

crate::impl_name_conversions!(Reminder {
    FiveMinutesBefore => "five-minutes-before",
    AtStartTime => "at-start-time",
});

impl Reminder {
    /// How long before the event start this reminder fires.
    pub fn offset(&self) -> Duration {
        match self {
            Self::FiveMinutesBefore => Duration::minutes(5),
            Self::AtStartTime => Duration::zero(),
        }
    }

    /// Largest offset over all reminders.
    pub fn max_offset() -> Duration {
        Self::ALL.iter().map(Self::offset).max().unwrap_or_else(Duration::zero)
    }

    /// Moment this reminder fires for an event starting at `start`.
    pub fn deadline_for(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start - self.offset()
    }
}

/// A reminder whose deadline has been reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub reminder: Reminder,
    pub event: CalendarEvent,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn offsets_are_checked_longest_first() {
        assert_eq!(Reminder::ALL, &[Reminder::FiveMinutesBefore, Reminder::AtStartTime]);
        assert_eq!(Reminder::max_offset(), Duration::minutes(5));
    }

    #[test]
    fn deadline_subtracts_offset() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        assert_eq!(
            Reminder::FiveMinutesBefore.deadline_for(start),
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 25, 0).unwrap()
        );
        assert_eq!(Reminder::AtStartTime.deadline_for(start), start);
    }
}
