//! Codec error types

use notifier_domain::{NotifierError, ProtocolVersion};
use thiserror::Error;

/// A line that could not be decoded into a [`super::Command`].
///
/// Displays as `Failed to parse command (<reason>) <line>`, which is the
/// message the device sends back after `ERROR: `.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to parse command ({reason}) {line}")]
pub struct ParseError {
    pub reason: String,
    pub line: String,
}

impl ParseError {
    pub fn new(reason: impl Into<String>, line: impl Into<String>) -> Self {
        Self { reason: reason.into(), line: line.into() }
    }
}

/// A command value that has no wire representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("command addresses no buttons")]
    NoButtons,

    #[error("text {text:?} cannot be carried by protocol {version}")]
    UnencodableText { text: String, version: ProtocolVersion },

    #[error("key press names no keys")]
    EmptyKeyPress,

    #[error("LED action buttons must match the keyset buttons")]
    LedButtonsMismatch,
}

impl From<ParseError> for NotifierError {
    fn from(err: ParseError) -> Self {
        NotifierError::Parse(err.to_string())
    }
}

impl From<EncodeError> for NotifierError {
    fn from(err: EncodeError) -> Self {
        NotifierError::Parse(err.to_string())
    }
}
