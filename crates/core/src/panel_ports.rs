//! Panel (device link) port interfaces

use async_trait::async_trait;
use notifier_domain::{Button, Colour, Keyset, Result};

use crate::protocol::Command;

/// Request/response access to the panel.
///
/// Implementations serialise round trips; at most one command is in flight.
/// A device `ERROR` reply surfaces as [`notifier_domain::NotifierError::Protocol`],
/// a broken link as [`notifier_domain::NotifierError::Link`].
#[async_trait]
pub trait PanelLink: Send + Sync {
    /// Send one command and return the device's result line.
    async fn send(&self, command: Command) -> Result<String>;

    async fn identify(&self) -> Result<String> {
        self.send(Command::Identify).await
    }

    async fn set_led(&self, buttons: Vec<Button>, colour: Colour) -> Result<()> {
        self.send(Command::SetLed { buttons, colour }).await.map(|_| ())
    }

    async fn set_key(&self, buttons: Vec<Button>, keyset: Keyset) -> Result<()> {
        self.send(Command::SetKey { buttons, keyset }).await.map(|_| ())
    }
}
