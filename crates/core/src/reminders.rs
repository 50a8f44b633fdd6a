//! Reminder deadline selection

use chrono::{DateTime, Utc};
use notifier_domain::{CalendarEvent, NotifierError, Reminder, ReminderEvent, Result};

/// The next reminder to fire for a calendar snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Deadline {
    pub at: DateTime<Utc>,
    pub reminder: Reminder,
    pub event: CalendarEvent,
}

impl Deadline {
    pub fn into_reminder_event(self) -> ReminderEvent {
        ReminderEvent { reminder: self.reminder, event: self.event }
    }
}

/// Selects the earliest reminder deadline strictly after `now`.
///
/// Events are scanned in start order; scanning stops once an event's
/// earliest possible deadline cannot beat the best candidate. Ties go to the
/// earlier event, then to the longer offset.
///
/// # Errors
///
/// [`NotifierError::SchedulingExhausted`] when no deadline lies in the future.
pub fn next_deadline(events: &[CalendarEvent], now: DateTime<Utc>) -> Result<Deadline> {
    let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
    sorted.sort_by_key(|event| event.start);

    let max_offset = Reminder::max_offset();
    let mut best: Option<(DateTime<Utc>, Reminder, &CalendarEvent)> = None;

    for event in sorted {
        if let Some((best_at, _, _)) = best {
            if event.start - max_offset >= best_at {
                break;
            }
        }

        for reminder in Reminder::ALL {
            let at = reminder.deadline_for(event.start);
            if at <= now {
                continue;
            }
            if best.map_or(true, |(best_at, _, _)| at < best_at) {
                best = Some((at, *reminder, event));
            }
        }
    }

    best.map(|(at, reminder, event)| Deadline { at, reminder, event: event.clone() })
        .ok_or(NotifierError::SchedulingExhausted)
}
