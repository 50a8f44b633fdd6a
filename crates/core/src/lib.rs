//! # Notifier Core
//!
//! Pure logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The wire protocol codec shared by host and device
//! - Reminder deadline selection and pull slot allocation
//! - The render plan mapping panel events to wire commands
//! - Port interfaces (traits) for calendar, pull, clock and panel collaborators
//!
//! ## Architecture Principles
//! - Only depends on `notifier-domain`
//! - No serial, HTTP, or runtime code
//! - All external dependencies via traits

pub mod protocol;
pub mod reminders;
pub mod render;
pub mod slots;

// Collaborator ports
pub mod calendar_ports;
pub mod panel_ports;
pub mod pull_ports;

pub use calendar_ports::{CalendarSource, Clock, SystemClock};
pub use panel_ports::PanelLink;
pub use protocol::{Command, EncodeError, ParseError};
pub use pull_ports::PullSource;
pub use reminders::{next_deadline, Deadline};
pub use render::{plan, PanelLayout};
pub use slots::{Allocation, SlotAllocator};
