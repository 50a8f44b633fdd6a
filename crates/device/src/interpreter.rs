//! Command interpreter and tick loop

use std::collections::BTreeMap;
use std::time::Duration;

use notifier_core::protocol::Command;
use notifier_domain::constants::REPLY_LOG_PREFIX;
use notifier_domain::{Button, Colour, KeyAction, Keyset, ProtocolVersion};
use tracing::{debug, info, warn};

use crate::io::DeviceIo;
use crate::reply::Reply;

/// Panel state: one colour per button and the keysets bound to buttons.
///
/// Created once at startup and owned by the tick loop.
#[derive(Debug, Clone)]
pub struct Interpreter {
    leds: Vec<Colour>,
    keysets: BTreeMap<Button, Keyset>,
    version: ProtocolVersion,
    leds_dirty: bool,
}

impl Interpreter {
    /// All LEDs off, no keysets bound.
    pub fn new(button_count: usize, version: ProtocolVersion) -> Self {
        Self {
            leds: vec![Colour::OFF; button_count],
            keysets: BTreeMap::new(),
            version,
            leds_dirty: false,
        }
    }

    pub fn button_count(&self) -> usize {
        self.leds.len()
    }

    pub fn leds(&self) -> &[Colour] {
        &self.leds
    }

    pub fn keyset(&self, button: Button) -> Option<&Keyset> {
        self.keysets.get(&button)
    }

    /// Decodes and applies one command line. State is untouched on error.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        let command = match Command::decode(line, self.version) {
            Ok(command) => command,
            Err(err) => return Reply::Error(err.to_string()),
        };

        let result = match command {
            Command::Identify => return Reply::Identity,
            Command::SetLed { buttons, colour } => self.set_leds(&buttons, colour),
            Command::SetKey { buttons, keyset } => self.set_keys(&buttons, keyset),
        };

        match result {
            Ok(()) => Reply::Ok,
            Err(message) => Reply::Error(message),
        }
    }

    /// One pass of the loop: serial input first, then the buttons.
    ///
    /// A received line is echoed before its reply. Keysets of pressed
    /// buttons run synchronously in ascending button order, so a `Sleep`
    /// stalls the whole loop.
    pub fn tick(&mut self, io: &mut impl DeviceIo) {
        if let Some(line) = io.poll_line() {
            let line = line.trim();
            if !line.is_empty() {
                io.write_line(line);
                let reply = self.handle_line(line);
                if reply.is_error() {
                    debug!(%line, %reply, "Rejected command");
                }
                io.write_line(&reply.to_string());
            }
        }
        self.flush_leds(io);

        let pressed = io.pressed_buttons();
        if !pressed.is_empty() {
            let mut leds_changed = false;
            let leds = &mut self.leds;
            for (button, keyset) in self.keysets.iter().filter(|(button, _)| pressed.contains(button)) {
                io.write_line(&format!("{REPLY_LOG_PREFIX}: execute keyset for button {button}"));
                leds_changed |= execute_keyset(keyset, leds, io);
            }
            self.leds_dirty |= leds_changed;
        }
        self.flush_leds(io);
    }

    fn set_leds(&mut self, buttons: &[Button], colour: Colour) -> Result<(), String> {
        self.check_buttons(buttons)?;
        for button in buttons {
            self.leds[usize::from(*button)] = colour;
        }
        self.leds_dirty = true;
        Ok(())
    }

    fn set_keys(&mut self, buttons: &[Button], keyset: Keyset) -> Result<(), String> {
        self.check_buttons(buttons)?;
        for button in buttons {
            if keyset.is_empty() {
                self.keysets.remove(button);
            } else {
                self.keysets.insert(*button, keyset.clone());
            }
        }
        Ok(())
    }

    fn check_buttons(&self, buttons: &[Button]) -> Result<(), String> {
        let count = self.leds.len();
        if buttons.iter().any(|button| usize::from(*button) >= count) {
            return Err(format!("button number must be positive int less than {count}"));
        }
        Ok(())
    }

    fn flush_leds(&mut self, io: &mut impl DeviceIo) {
        if self.leds_dirty {
            io.show_leds(&self.leds);
            self.leds_dirty = false;
        }
    }
}

/// Runs the actions in order. Returns whether any LED changed.
fn execute_keyset(keyset: &Keyset, leds: &mut [Colour], io: &mut impl DeviceIo) -> bool {
    let mut leds_changed = false;
    for action in keyset {
        match action {
            KeyAction::Sleep(duration) => io.delay(*duration),
            KeyAction::PressKeys(keys) => io.press_keys(keys),
            KeyAction::WriteText(text) => io.write_text(text),
            KeyAction::SetLeds(buttons, colour) => {
                for button in buttons {
                    match leds.get_mut(usize::from(*button)) {
                        Some(led) => {
                            *led = *colour;
                            leds_changed = true;
                        }
                        None => warn!(button, "LED action outside the panel"),
                    }
                }
            }
        }
    }
    leds_changed
}

/// Drives [`Interpreter::tick`] at a fixed period while `keep_running` holds.
pub fn run(
    interpreter: &mut Interpreter,
    io: &mut impl DeviceIo,
    period: Duration,
    mut keep_running: impl FnMut() -> bool,
) {
    info!(buttons = interpreter.button_count(), period_ms = period.as_millis(), "Panel loop started");
    while keep_running() {
        interpreter.tick(io);
        io.delay(period);
    }
    info!("Panel loop stopped");
}
