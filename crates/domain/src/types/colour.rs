//! LED colour values

use serde::{Deserialize, Serialize};

/// RGB colour with an optional per-LED brightness.
///
/// Brightness is only present when the sender supplied one; the device keeps
/// whatever value it was given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub brightness: Option<f32>,
}

impl Colour {
    pub const OFF: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const ORANGE: Self = Self::rgb(255, 100, 0);
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    pub const CYAN: Self = Self::rgb(0, 255, 255);

    /// Colour without an explicit brightness.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, brightness: None }
    }

    pub fn with_brightness(self, brightness: f32) -> Self {
        Self { brightness: Some(brightness), ..self }
    }

    pub const fn is_off(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}
