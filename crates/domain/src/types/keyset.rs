//! Keyset vocabulary: the macro a button runs when pressed

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Button, Colour, Keycode};

/// One step of a keyset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeyAction {
    /// Block for the given duration.
    Sleep(Duration),
    /// Press the keys together, then release them.
    PressKeys(Vec<Keycode>),
    /// Type the text through the keyboard layout.
    WriteText(String),
    /// Recolour the given buttons.
    SetLeds(Vec<Button>, Colour),
}

/// Ordered actions bound to a button. An empty keyset leaves the button unbound.
pub type Keyset = Vec<KeyAction>;

impl KeyAction {
    pub fn press(keys: &[Keycode]) -> Self {
        Self::PressKeys(keys.to_vec())
    }

    pub fn write(text: impl Into<String>) -> Self {
        Self::WriteText(text.into())
    }
}
