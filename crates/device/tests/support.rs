//! Scripted hardware for interpreter tests.

use std::collections::VecDeque;
use std::time::Duration;

use notifier_device::DeviceIo;
use notifier_domain::{Button, Colour, Keycode};

/// Side effect observed by [`ScriptedIo`], in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Line(String),
    Keys(Vec<Keycode>),
    Text(String),
    Delay(Duration),
    Leds(Vec<Colour>),
}

/// Feeds queued input lines and button presses, records every effect.
#[derive(Debug, Default)]
pub struct ScriptedIo {
    pub input: VecDeque<String>,
    pub presses: VecDeque<Vec<Button>>,
    pub effects: Vec<Effect>,
}

#[allow(dead_code)]
impl ScriptedIo {
    pub fn with_lines(lines: &[&str]) -> Self {
        Self { input: lines.iter().map(|l| (*l).to_string()).collect(), ..Self::default() }
    }

    pub fn press(&mut self, buttons: &[Button]) {
        self.presses.push_back(buttons.to_vec());
    }

    pub fn lines(&self) -> Vec<&str> {
        self.effects
            .iter()
            .filter_map(|e| match e {
                Effect::Line(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_leds(&self) -> Option<&[Colour]> {
        self.effects.iter().rev().find_map(|e| match e {
            Effect::Leds(leds) => Some(leds.as_slice()),
            _ => None,
        })
    }
}

impl DeviceIo for ScriptedIo {
    fn poll_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }

    fn write_line(&mut self, line: &str) {
        self.effects.push(Effect::Line(line.to_string()));
    }

    fn pressed_buttons(&mut self) -> Vec<Button> {
        self.presses.pop_front().unwrap_or_default()
    }

    fn press_keys(&mut self, keys: &[Keycode]) {
        self.effects.push(Effect::Keys(keys.to_vec()));
    }

    fn write_text(&mut self, text: &str) {
        self.effects.push(Effect::Text(text.to_string()));
    }

    fn delay(&mut self, duration: Duration) {
        self.effects.push(Effect::Delay(duration));
    }

    fn show_leds(&mut self, leds: &[Colour]) {
        self.effects.push(Effect::Leds(leds.to_vec()));
    }
}
