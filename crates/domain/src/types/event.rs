//! Panel events flowing from the pollers to the dispatcher

use super::{Pull, ReminderEvent, Slot};

/// A render-once unit of work for the dispatcher.
///
/// Producers move events into the queue; the dispatcher is the single
/// consumer and renders each exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CalendarReminder(ReminderEvent),
    PullUpdate(Pull, Slot),
    PullCleared(Slot),
}

impl Event {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CalendarReminder(_) => "calendar_reminder",
            Self::PullUpdate(..) => "pull_update",
            Self::PullCleared(_) => "pull_cleared",
        }
    }
}
