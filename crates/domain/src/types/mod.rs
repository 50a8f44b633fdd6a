//! Domain types and models
//!
//! Everything that crosses a component boundary lives here: calendar
//! snapshots and reminders, pull-request states, the panel event union, and
//! the keyset vocabulary shared by the host encoder and the device
//! interpreter.

pub mod calendar;
pub mod colour;
pub mod event;
pub mod keycode;
pub mod keyset;
pub mod pull;

use serde::{Deserialize, Serialize};

pub use calendar::{CalendarEvent, Reminder, ReminderEvent};
pub use colour::Colour;
pub use event::Event;
pub use keycode::Keycode;
pub use keyset::{KeyAction, Keyset};
pub use pull::{Pull, PullState};

/// Index of a physical button (and its LED).
pub type Button = u8;

/// Index into the bounded pull-request slot range.
pub type Slot = u8;

/// Wire protocol revision shared by host and device.
///
/// The revisions differ only in how `w` (write text) payloads travel:
/// `V1` carries the literal text, `V2` carries its hex-encoded UTF-8 bytes so
/// delimiters inside the text survive the grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolVersion {
    V1,
    #[default]
    V2,
}

crate::impl_name_conversions!(ProtocolVersion {
    V1 => "v1",
    V2 => "v2",
});
