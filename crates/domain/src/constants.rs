//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

use std::time::Duration;

// Device
pub const DEVICE_IDENTITY: &str = "Notifier/0.1";
pub const DEFAULT_BUTTON_COUNT: usize = 16;
pub const DEVICE_TICK_PERIOD: Duration = Duration::from_millis(100);

// Wire protocol
pub const COMMAND_IDENTIFY: &str = "IDENTIFY";
pub const COMMAND_SET_LED: &str = "SET LED";
pub const COMMAND_SET_KEY: &str = "SET KEY";
pub const REPLY_OK: &str = "OK";
pub const REPLY_ERROR_PREFIX: &str = "ERROR";
pub const REPLY_LOG_PREFIX: &str = "LOG";
pub const LINE_TERMINATOR: &str = "\r";

// Serial link
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const SERIAL_READ_TIMEOUT_MS: u64 = 50;
pub const SERIAL_RESPONSE_TIMEOUT_MS: u64 = 5_000;
/// Settle time between writing a command and reading its echo.
pub const SERIAL_SETTLE_MS: u64 = 50;

// Pollers
pub const CALENDAR_POLL_SECS: u64 = 60 * 10;
pub const CALENDAR_EXHAUSTED_BACKOFF_SECS: u64 = 60;
pub const CALENDAR_MAX_RESULTS: u32 = 50;
pub const GITHUB_POLL_SECS: u64 = 60;
pub const FETCH_TIMEOUT_SECS: u64 = 30;
/// Attempts per HTTP request, including the first one.
pub const FETCH_RETRY_ATTEMPTS: u32 = 3;
pub const FETCH_RETRY_BACKOFF_MS: u64 = 250;

// Dispatcher
pub const DISPATCH_IDLE_SECS: u64 = 10;

// Panel layout
pub const REMINDER_BUTTONS: [u8; 4] = [0, 1, 4, 5];
pub const PULL_SLOT_OFFSET: u8 = 8;
pub const PULL_SLOT_COUNT: u8 = 8;
