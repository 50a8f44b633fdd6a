//! Conversions from external infrastructure errors into domain errors.

use notifier_domain::NotifierError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub NotifierError);

impl From<InfraError> for NotifierError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<NotifierError> for InfraError {
    fn from(value: NotifierError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoNotifierError {
    fn into_notifier(self) -> NotifierError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → NotifierError */
/* -------------------------------------------------------------------------- */

impl IntoNotifierError for std::io::Error {
    fn into_notifier(self) -> NotifierError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::TimedOut => NotifierError::Link("serial read timed out".into()),
            ErrorKind::UnexpectedEof | ErrorKind::BrokenPipe => {
                NotifierError::Link("serial channel closed".into())
            }
            _ => NotifierError::Link(format!("serial I/O failure: {self}")),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_notifier())
    }
}

/* -------------------------------------------------------------------------- */
/* serialport::Error → NotifierError */
/* -------------------------------------------------------------------------- */

#[cfg(feature = "serial")]
impl IntoNotifierError for serialport::Error {
    fn into_notifier(self) -> NotifierError {
        use serialport::ErrorKind as SK;

        match self.kind() {
            SK::NoDevice => NotifierError::Link(format!("serial device not found: {}", self.description)),
            SK::InvalidInput => NotifierError::Config(format!("invalid serial settings: {}", self.description)),
            SK::Io(_) | SK::Unknown => NotifierError::Link(format!("serial port failure: {}", self.description)),
        }
    }
}

#[cfg(feature = "serial")]
impl From<serialport::Error> for InfraError {
    fn from(value: serialport::Error) -> Self {
        InfraError(value.into_notifier())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → NotifierError */
/* -------------------------------------------------------------------------- */

impl IntoNotifierError for HttpError {
    fn into_notifier(self) -> NotifierError {
        if self.is_timeout() {
            return NotifierError::Fetch("HTTP request timed out".into());
        }

        if self.is_connect() {
            return NotifierError::Fetch("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 => NotifierError::Config(format!("{message}: check the API token")),
                _ => NotifierError::Fetch(message),
            };
        }

        NotifierError::Fetch(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_notifier())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
