//! Render plan: panel events to wire commands
//!
//! Rendering is pure. The dispatcher sends the planned commands in order.

use std::time::Duration;

use notifier_domain::{
    Button, Colour, Event, KeyAction, Keycode, Keyset, PanelConfig, Pull, PullState, Reminder, Slot,
};
use tracing::warn;

use crate::protocol::Command;

/// Browser launched by the open-URL macro.
const BROWSER: &str = "firefox";

/// Physical placement of reminder and pull indicators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    pub reminder_buttons: Vec<Button>,
    pub pull_slot_offset: Button,
    pub pull_slot_count: Slot,
}

impl PanelLayout {
    /// Button showing the given pull slot, if the slot exists.
    pub fn pull_button(&self, slot: Slot) -> Option<Button> {
        if slot < self.pull_slot_count {
            self.pull_slot_offset.checked_add(slot)
        } else {
            None
        }
    }
}

impl From<&PanelConfig> for PanelLayout {
    fn from(config: &PanelConfig) -> Self {
        Self {
            reminder_buttons: config.reminder_buttons.clone(),
            pull_slot_offset: config.pull_slot_offset,
            pull_slot_count: config.pull_slot_count,
        }
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::from(&PanelConfig::default())
    }
}

/// Colour signalling reminder urgency.
pub fn reminder_colour(reminder: Reminder) -> Colour {
    match reminder {
        Reminder::FiveMinutesBefore => Colour::ORANGE,
        Reminder::AtStartTime => Colour::RED,
    }
}

pub fn pull_colour(state: PullState) -> Colour {
    match state {
        PullState::Pending => Colour::YELLOW,
        PullState::Failed => Colour::RED,
        PullState::Merge => Colour::GREEN,
        PullState::Done => Colour::OFF,
    }
}

/// Keyset that brings the browser forward and opens `url` in it.
pub fn open_url_keyset(url: &str) -> Keyset {
    vec![
        KeyAction::press(&[Keycode::Command, Keycode::Space]),
        KeyAction::Sleep(Duration::from_millis(200)),
        KeyAction::write(BROWSER),
        KeyAction::press(&[Keycode::Enter]),
        KeyAction::Sleep(Duration::from_secs(1)),
        KeyAction::press(&[Keycode::Command, Keycode::L]),
        KeyAction::write(url),
        KeyAction::press(&[Keycode::Enter]),
    ]
}

/// Plans the commands that render one event.
///
/// A pull slot outside the layout renders nothing.
pub fn plan(event: &Event, layout: &PanelLayout) -> Vec<Command> {
    match event {
        Event::CalendarReminder(reminder_event) => {
            let buttons = layout.reminder_buttons.clone();
            vec![
                Command::SetLed { buttons: buttons.clone(), colour: reminder_colour(reminder_event.reminder) },
                Command::SetKey {
                    keyset: vec![KeyAction::SetLeds(buttons.clone(), Colour::OFF)],
                    buttons,
                },
            ]
        }
        Event::PullUpdate(Pull { url, state }, slot) => match layout.pull_button(*slot) {
            Some(button) => vec![
                Command::SetLed { buttons: vec![button], colour: pull_colour(*state) },
                Command::SetKey { buttons: vec![button], keyset: open_url_keyset(url) },
            ],
            None => {
                warn!(slot, "Pull slot outside the panel layout");
                Vec::new()
            }
        },
        Event::PullCleared(slot) => match layout.pull_button(*slot) {
            Some(button) => vec![
                Command::SetLed { buttons: vec![button], colour: Colour::OFF },
                Command::SetKey { buttons: vec![button], keyset: Vec::new() },
            ],
            None => {
                warn!(slot, "Cleared slot outside the panel layout");
                Vec::new()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use notifier_domain::{CalendarEvent, ProtocolVersion, ReminderEvent};

    use super::*;

    fn reminder(reminder: Reminder) -> Event {
        let start = Utc.with_ymd_and_hms(2026, 5, 11, 10, 0, 0).unwrap();
        Event::CalendarReminder(ReminderEvent { reminder, event: CalendarEvent::new(start, "sync") })
    }

    fn lines(commands: &[Command]) -> Vec<String> {
        commands.iter().map(|c| c.encode(ProtocolVersion::V2).unwrap()).collect()
    }

    #[test]
    fn reminder_lights_quad_and_installs_acknowledge() {
        let layout = PanelLayout::default();

        assert_eq!(
            lines(&plan(&reminder(Reminder::FiveMinutesBefore), &layout)),
            vec!["SET LED:0/1/4/5,255*100*0", "SET KEY:0/1/4/5,l0*0*0"]
        );
        assert_eq!(
            lines(&plan(&reminder(Reminder::AtStartTime), &layout))[0],
            "SET LED:0/1/4/5,255*0*0"
        );
    }

    #[test]
    fn pull_update_uses_offset_button_and_state_colour() {
        let layout = PanelLayout::default();
        let pull = Pull::new("https://github.com/acme/widgets/pull/7", PullState::Merge);

        let commands = plan(&Event::PullUpdate(pull.clone(), 2), &layout);

        assert_eq!(commands[0], Command::SetLed { buttons: vec![10], colour: Colour::GREEN });
        assert_eq!(
            commands[1],
            Command::SetKey { buttons: vec![10], keyset: open_url_keyset(&pull.url) }
        );
    }

    #[test]
    fn cleared_slot_turns_off_and_unbinds() {
        let commands = plan(&Event::PullCleared(0), &PanelLayout::default());
        assert_eq!(lines(&commands), vec!["SET LED:8,0*0*0", "SET KEY:8,"]);
    }

    #[test]
    fn slot_outside_layout_renders_nothing() {
        assert!(plan(&Event::PullCleared(8), &PanelLayout::default()).is_empty());
    }

    #[test]
    fn pull_states_map_to_colours() {
        assert_eq!(pull_colour(PullState::Pending), Colour::YELLOW);
        assert_eq!(pull_colour(PullState::Failed), Colour::RED);
        assert_eq!(pull_colour(PullState::Done), Colour::OFF);
    }
}
