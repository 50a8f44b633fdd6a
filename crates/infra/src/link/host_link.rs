//! Request/response round trips over a serial channel

use std::time::{Duration, Instant};

use notifier_core::protocol::Command;
use notifier_domain::constants::{
    LINE_TERMINATOR, REPLY_ERROR_PREFIX, REPLY_LOG_PREFIX, SERIAL_RESPONSE_TIMEOUT_MS, SERIAL_SETTLE_MS,
};
use notifier_domain::{Button, Colour, Keyset, ProtocolVersion};
use tracing::{debug, info, instrument};

use super::channel::SerialChannel;
use super::error::{LinkError, LinkResult};

/// Blocking, non-reentrant client for the panel.
///
/// Each call writes one command, waits for the device to echo it, then
/// returns the result line. `LOG` lines are forwarded to tracing under the
/// `notifier::device` target; unrelated lines are skipped.
pub struct HostLink<C> {
    channel: C,
    version: ProtocolVersion,
    response_timeout: Duration,
    settle: Duration,
}

impl<C: SerialChannel> HostLink<C> {
    pub fn new(channel: C, version: ProtocolVersion) -> Self {
        Self {
            channel,
            version,
            response_timeout: Duration::from_millis(SERIAL_RESPONSE_TIMEOUT_MS),
            settle: Duration::from_millis(SERIAL_SETTLE_MS),
        }
    }

    /// Bound on the echo + result wait of one round trip.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Pause between writing a command and reading its echo.
    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn identify(&mut self) -> LinkResult<String> {
        self.send_command(&Command::Identify)
    }

    pub fn set_led(&mut self, buttons: Vec<Button>, colour: Colour) -> LinkResult<String> {
        self.send_command(&Command::SetLed { buttons, colour })
    }

    pub fn set_key(&mut self, buttons: Vec<Button>, keyset: Keyset) -> LinkResult<String> {
        self.send_command(&Command::SetKey { buttons, keyset })
    }

    /// Encodes and sends one command, returning the device's result line.
    ///
    /// # Errors
    /// - [`LinkError::Device`] when the device answers `ERROR`
    /// - [`LinkError::Timeout`] when echo and result do not arrive in time
    /// - [`LinkError::Encode`] / [`LinkError::Io`] otherwise
    pub fn send_command(&mut self, command: &Command) -> LinkResult<String> {
        let line = command.encode(self.version)?;
        self.send_line(&line)
    }

    /// Sends an already encoded command line.
    #[instrument(skip(self), fields(command = %line))]
    pub fn send_line(&mut self, line: &str) -> LinkResult<String> {
        if let Some(pending) = self.read_pending()? {
            debug!(line = %pending, "PRE");
        }

        self.channel.write_all(format!("{line}{LINE_TERMINATOR}").as_bytes())?;
        self.channel.flush()?;
        std::thread::sleep(self.settle);

        let deadline = Instant::now() + self.response_timeout;
        loop {
            let received = self.next_line(deadline)?;
            if received.starts_with(line) {
                break;
            }
            debug!(line = %received, "SKIP");
        }

        let result = self.next_line(deadline)?;
        match result.strip_prefix(REPLY_ERROR_PREFIX) {
            Some(rest) => {
                let message = rest.strip_prefix(':').unwrap_or(rest).trim().to_string();
                Err(LinkError::Device { message })
            }
            None => Ok(result),
        }
    }

    /// Drains at most one stale non-log line left from an earlier exchange.
    fn read_pending(&mut self) -> LinkResult<Option<String>> {
        while let Some(line) = self.channel.read_line()? {
            let line = line.trim();
            if self.forward_log(line) {
                continue;
            }
            return Ok((!line.is_empty()).then(|| line.to_string()));
        }
        Ok(None)
    }

    /// Next non-empty, non-log line before `deadline`.
    fn next_line(&mut self, deadline: Instant) -> LinkResult<String> {
        loop {
            if Instant::now() >= deadline {
                return Err(LinkError::Timeout { timeout: self.response_timeout });
            }
            let Some(line) = self.channel.read_line()? else {
                continue;
            };
            let line = line.trim();
            if line.is_empty() || self.forward_log(line) {
                continue;
            }
            return Ok(line.to_string());
        }
    }

    fn forward_log(&self, line: &str) -> bool {
        if line.starts_with(REPLY_LOG_PREFIX) {
            info!(target: "notifier::device", "{line}");
            true
        } else {
            false
        }
    }
}
