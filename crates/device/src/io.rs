//! Hardware port for the interpreter

use std::time::Duration;

use notifier_domain::{Button, Colour, Keycode};

/// Side effects available to the interpreter.
///
/// Everything is blocking; the interpreter runs on a single thread.
pub trait DeviceIo {
    /// A complete input line, if one has arrived since the last call.
    fn poll_line(&mut self) -> Option<String>;

    fn write_line(&mut self, line: &str);

    /// Buttons currently held down.
    fn pressed_buttons(&mut self) -> Vec<Button>;

    /// Press the keys together, then release all of them.
    fn press_keys(&mut self, keys: &[Keycode]);

    fn write_text(&mut self, text: &str);

    fn delay(&mut self, duration: Duration);

    /// Push the full LED buffer to the hardware.
    fn show_leds(&mut self, leds: &[Colour]);
}
