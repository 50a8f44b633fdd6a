//! Wire commands: `IDENTIFY`, `SET LED`, `SET KEY`

use std::fmt;

use notifier_domain::constants::{COMMAND_IDENTIFY, COMMAND_SET_KEY, COMMAND_SET_LED};
use notifier_domain::{Button, Colour, Keyset, ProtocolVersion};

use super::error::{EncodeError, ParseError};
use super::keyset::{decode_action, decode_colour, encode_action, encode_colour};

/// A single wire command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Identify,
    SetLed { buttons: Vec<Button>, colour: Colour },
    /// An empty keyset unbinds the buttons.
    SetKey { buttons: Vec<Button>, keyset: Keyset },
}

impl Command {
    /// Wire name of the command.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Identify => COMMAND_IDENTIFY,
            Self::SetLed { .. } => COMMAND_SET_LED,
            Self::SetKey { .. } => COMMAND_SET_KEY,
        }
    }

    /// Renders the command as one wire line, without the terminator.
    pub fn encode(&self, version: ProtocolVersion) -> Result<String, EncodeError> {
        match self {
            Self::Identify => Ok(COMMAND_IDENTIFY.to_string()),
            Self::SetLed { buttons, colour } => {
                Ok(format!("{COMMAND_SET_LED}:{},{}", encode_buttons(buttons)?, encode_colour(colour)))
            }
            Self::SetKey { buttons, keyset } => {
                let actions = keyset
                    .iter()
                    .map(|action| encode_action(action, buttons, version))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("{COMMAND_SET_KEY}:{},{}", encode_buttons(buttons)?, actions.join("/")))
            }
        }
    }

    /// Parses one wire line. The command name is matched case-insensitively.
    pub fn decode(line: &str, version: ProtocolVersion) -> Result<Self, ParseError> {
        let line = line.trim();
        decode_fields(line, version).map_err(|reason| ParseError::new(reason, line))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode(ProtocolVersion::V2) {
            Ok(line) => f.write_str(&line),
            Err(err) => write!(f, "{} <{err}>", self.name()),
        }
    }
}

fn decode_fields(line: &str, version: ProtocolVersion) -> Result<Command, String> {
    let (name, args) = match line.split_once(':') {
        Some((name, rest)) => (name, rest.split(',').collect::<Vec<_>>()),
        None => (line, Vec::new()),
    };

    if name.eq_ignore_ascii_case(COMMAND_IDENTIFY) {
        Ok(Command::Identify)
    } else if name.eq_ignore_ascii_case(COMMAND_SET_LED) {
        let [buttons, colour] = two_arguments(&args)?;
        Ok(Command::SetLed { buttons: decode_buttons(buttons)?, colour: decode_colour(colour)? })
    } else if name.eq_ignore_ascii_case(COMMAND_SET_KEY) {
        let [buttons, actions] = two_arguments(&args)?;
        let buttons = decode_buttons(buttons)?;
        let keyset: Keyset = if actions.is_empty() {
            Vec::new()
        } else {
            actions
                .split('/')
                .map(|action| decode_action(action, &buttons, version))
                .collect::<Result<_, _>>()?
        };
        Ok(Command::SetKey { buttons, keyset })
    } else {
        Err("unknown command".to_string())
    }
}

fn two_arguments<'a>(args: &[&'a str]) -> Result<[&'a str; 2], String> {
    match args {
        [first, second] => Ok([*first, *second]),
        _ => Err("expected 2 arguments".to_string()),
    }
}

fn decode_buttons(value: &str) -> Result<Vec<Button>, String> {
    value
        .split('/')
        .map(|part| part.parse::<Button>().map_err(|_| format!("invalid button {part:?}")))
        .collect()
}

fn encode_buttons(buttons: &[Button]) -> Result<String, EncodeError> {
    if buttons.is_empty() {
        return Err(EncodeError::NoButtons);
    }
    let parts: Vec<String> = buttons.iter().map(ToString::to_string).collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use notifier_domain::{KeyAction, Keycode};

    use super::*;

    const V1: ProtocolVersion = ProtocolVersion::V1;
    const V2: ProtocolVersion = ProtocolVersion::V2;

    #[test]
    fn decodes_set_key_example() {
        let command = Command::decode("SET KEY:0/1,s0.2/kCOMMAND|T/wfirefox", V1).unwrap();
        assert_eq!(
            command,
            Command::SetKey {
                buttons: vec![0, 1],
                keyset: vec![
                    KeyAction::Sleep(Duration::from_millis(200)),
                    KeyAction::PressKeys(vec![Keycode::Command, Keycode::T]),
                    KeyAction::WriteText("firefox".to_string()),
                ],
            }
        );
    }

    #[test]
    fn decodes_set_led_with_and_without_brightness() {
        assert_eq!(
            Command::decode("SET LED:2,10*20*30", V2).unwrap(),
            Command::SetLed { buttons: vec![2], colour: Colour::rgb(10, 20, 30) }
        );
        assert_eq!(
            Command::decode("set led:2/3,10*20*30*0.5\r\n", V2).unwrap(),
            Command::SetLed { buttons: vec![2, 3], colour: Colour::rgb(10, 20, 30).with_brightness(0.5) }
        );
    }

    #[test]
    fn identify_ignores_arguments() {
        assert_eq!(Command::decode("IDENTIFY", V2).unwrap(), Command::Identify);
        assert_eq!(Command::decode("identify:whatever,else", V2).unwrap(), Command::Identify);
    }

    #[test]
    fn malformed_lines_report_reason_and_line() {
        let err = Command::decode("SET LED:abc,1*2*3", V2).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse command (invalid button \"abc\") SET LED:abc,1*2*3");

        let err = Command::decode("SET LED:1", V2).unwrap_err();
        assert_eq!(err.reason, "expected 2 arguments");

        let err = Command::decode("SET KEY:1,s1,extra", V2).unwrap_err();
        assert_eq!(err.reason, "expected 2 arguments");

        let err = Command::decode("REBOOT", V2).unwrap_err();
        assert_eq!(err.reason, "unknown command");
    }

    #[test]
    fn empty_action_list_is_an_empty_keyset() {
        assert_eq!(
            Command::decode("SET KEY:3,", V2).unwrap(),
            Command::SetKey { buttons: vec![3], keyset: Vec::new() }
        );
    }

    #[test]
    fn encode_then_decode_preserves_commands() {
        let commands = [
            Command::Identify,
            Command::SetLed { buttons: vec![0, 1, 4, 5], colour: Colour::ORANGE },
            Command::SetLed { buttons: vec![9], colour: Colour::CYAN.with_brightness(0.25) },
            Command::SetKey { buttons: vec![8], keyset: Vec::new() },
            Command::SetKey {
                buttons: vec![0, 1],
                keyset: vec![
                    KeyAction::press(&[Keycode::Command, Keycode::Space]),
                    KeyAction::Sleep(Duration::from_secs(1)),
                    KeyAction::write("https://example.com/a/b?c=1,2"),
                    KeyAction::SetLeds(vec![0, 1], Colour::OFF),
                ],
            },
        ];
        for command in commands {
            let line = command.encode(V2).unwrap();
            assert_eq!(Command::decode(&line, V2).unwrap(), command, "line {line}");
        }
    }

    #[test]
    fn encoding_rejects_empty_button_lists() {
        let command = Command::SetLed { buttons: Vec::new(), colour: Colour::RED };
        assert_eq!(command.encode(V2), Err(EncodeError::NoButtons));
    }

    #[test]
    fn display_uses_v2_encoding() {
        let command = Command::SetKey { buttons: vec![1], keyset: vec![KeyAction::write("hi")] };
        assert_eq!(command.to_string(), "SET KEY:1,w6869");
    }
}
