//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CALENDAR_EXHAUSTED_BACKOFF_SECS, CALENDAR_MAX_RESULTS, CALENDAR_POLL_SECS,
    DEFAULT_BAUD_RATE, DEFAULT_BUTTON_COUNT, DEFAULT_SERIAL_PORT, DISPATCH_IDLE_SECS,
    FETCH_TIMEOUT_SECS, GITHUB_POLL_SECS, PULL_SLOT_COUNT, PULL_SLOT_OFFSET, REMINDER_BUTTONS,
    SERIAL_READ_TIMEOUT_MS, SERIAL_RESPONSE_TIMEOUT_MS,
};
use crate::errors::{NotifierError, Result};
use crate::types::ProtocolVersion;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub calendar: CalendarConfig,
    pub github: GithubConfig,
    pub panel: PanelConfig,
    pub dispatcher: DispatcherConfig,
    pub logging: LoggingConfig,
}

/// Serial link to the panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    /// Short per-read timeout of the port.
    pub read_timeout_ms: u64,
    /// Upper bound for one echo + result round trip.
    pub response_timeout_ms: u64,
    pub protocol: ProtocolVersion,
}

/// Calendar reminder source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    pub enabled: bool,
    pub calendar_ids: Vec<String>,
    pub poll_interval_seconds: u64,
    /// Re-poll delay used when a snapshot holds no future reminder.
    pub exhausted_backoff_seconds: u64,
    pub fetch_timeout_seconds: u64,
    pub max_results: u32,
    pub api_base: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

/// Pull-request source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub enabled: bool,
    pub author: String,
    pub poll_interval_seconds: u64,
    pub fetch_timeout_seconds: u64,
    pub api_base: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

/// Physical layout of the button grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub button_count: usize,
    /// Buttons lit together for a calendar reminder.
    pub reminder_buttons: Vec<u8>,
    /// First button of the pull-request slot range.
    pub pull_slot_offset: u8,
    pub pull_slot_count: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Wait before an idle liveness tick.
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: SERIAL_READ_TIMEOUT_MS,
            response_timeout_ms: SERIAL_RESPONSE_TIMEOUT_MS,
            protocol: ProtocolVersion::V2,
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            calendar_ids: vec!["primary".to_string()],
            poll_interval_seconds: CALENDAR_POLL_SECS,
            exhausted_backoff_seconds: CALENDAR_EXHAUSTED_BACKOFF_SECS,
            fetch_timeout_seconds: FETCH_TIMEOUT_SECS,
            max_results: CALENDAR_MAX_RESULTS,
            api_base: "https://www.googleapis.com/calendar/v3".to_string(),
            access_token: None,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            author: String::new(),
            poll_interval_seconds: GITHUB_POLL_SECS,
            fetch_timeout_seconds: FETCH_TIMEOUT_SECS,
            api_base: "https://api.github.com".to_string(),
            token: None,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            button_count: DEFAULT_BUTTON_COUNT,
            reminder_buttons: REMINDER_BUTTONS.to_vec(),
            pull_slot_offset: PULL_SLOT_OFFSET,
            pull_slot_count: PULL_SLOT_COUNT,
        }
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { idle_timeout_seconds: DISPATCH_IDLE_SECS }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: "info,notifier_infra=debug".to_string(), format: LogFormat::Pretty }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl CalendarConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Backoff after an exhausted snapshot, capped by the poll interval.
    pub fn exhausted_backoff(&self) -> Duration {
        Duration::from_secs(self.exhausted_backoff_seconds.min(self.poll_interval_seconds))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl GithubConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl PanelConfig {
    /// Buttons reserved for pull-request slots, in slot order.
    pub fn pull_buttons(&self) -> std::ops::Range<usize> {
        let start = usize::from(self.pull_slot_offset);
        start..start + usize::from(self.pull_slot_count)
    }
}

impl DispatcherConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

impl Config {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `NotifierError::Config` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.calendar.poll_interval_seconds == 0 || self.github.poll_interval_seconds == 0 {
            return Err(NotifierError::Config("poll intervals must be non-zero".into()));
        }
        if self.dispatcher.idle_timeout_seconds == 0 {
            return Err(NotifierError::Config("dispatcher idle timeout must be non-zero".into()));
        }
        if self.serial.response_timeout_ms == 0 {
            return Err(NotifierError::Config("serial response timeout must be non-zero".into()));
        }

        let panel = &self.panel;
        if panel.pull_slot_count == 0 {
            return Err(NotifierError::Config("pull_slot_count must be at least 1".into()));
        }
        if panel.reminder_buttons.is_empty() {
            return Err(NotifierError::Config("reminder_buttons must not be empty".into()));
        }

        let pull_buttons = panel.pull_buttons();
        if pull_buttons.end > panel.button_count {
            return Err(NotifierError::Config(format!(
                "pull slots {}..{} exceed button count {}",
                pull_buttons.start, pull_buttons.end, panel.button_count
            )));
        }

        for &button in &panel.reminder_buttons {
            let button = usize::from(button);
            if button >= panel.button_count {
                return Err(NotifierError::Config(format!(
                    "reminder button {button} exceeds button count {}",
                    panel.button_count
                )));
            }
            if pull_buttons.contains(&button) {
                return Err(NotifierError::Config(format!(
                    "reminder button {button} overlaps the pull slot range"
                )));
            }
        }

        if self.github.enabled && self.github.author.trim().is_empty() {
            return Err(NotifierError::Config("github.author is required".into()));
        }

        Ok(())
    }
}
