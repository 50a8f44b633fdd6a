//! Keyset action codec (`s`, `k`, `w`, `l` tags)

use std::time::Duration;

use notifier_domain::{Button, Colour, KeyAction, Keycode, ProtocolVersion};

use super::error::EncodeError;

const TAG_SLEEP: char = 's';
const TAG_KEYS: char = 'k';
const TAG_WRITE: char = 'w';
const TAG_LEDS: char = 'l';

/// Characters a literal (v1) text payload cannot contain.
const V1_RESERVED: [char; 4] = ['/', ',', '\r', '\n'];

/// Decodes one action. `buttons` are the buttons of the enclosing `SET KEY`,
/// which an `l` action recolours.
///
/// Errors are bare reasons; the command decoder wraps them with the line.
pub fn decode_action(
    action: &str,
    buttons: &[Button],
    version: ProtocolVersion,
) -> Result<KeyAction, String> {
    let mut chars = action.chars();
    let (Some(tag), payload) = (chars.next(), chars.as_str()) else {
        return Err(format!("key command not long enough: {action}"));
    };
    if payload.is_empty() {
        return Err(format!("key command not long enough: {action}"));
    }

    match tag {
        TAG_SLEEP => decode_sleep(payload).map(KeyAction::Sleep),
        TAG_KEYS => payload
            .split('|')
            .map(|name| name.parse::<Keycode>().map_err(|_| format!("invalid keycode {name}")))
            .collect::<Result<Vec<_>, _>>()
            .map(KeyAction::PressKeys),
        TAG_WRITE => decode_text(payload, version).map(KeyAction::WriteText),
        TAG_LEDS => decode_colour(payload).map(|colour| KeyAction::SetLeds(buttons.to_vec(), colour)),
        _ => Err(format!("unknown key command {action}")),
    }
}

/// Encodes one action bound to `buttons`.
pub fn encode_action(
    action: &KeyAction,
    buttons: &[Button],
    version: ProtocolVersion,
) -> Result<String, EncodeError> {
    match action {
        KeyAction::Sleep(duration) => Ok(format!("{TAG_SLEEP}{}", encode_secs(*duration))),
        KeyAction::PressKeys(keys) => {
            if keys.is_empty() {
                return Err(EncodeError::EmptyKeyPress);
            }
            let names: Vec<&str> = keys.iter().map(Keycode::name).collect();
            Ok(format!("{TAG_KEYS}{}", names.join("|")))
        }
        KeyAction::WriteText(text) => Ok(format!("{TAG_WRITE}{}", encode_text(text, version)?)),
        KeyAction::SetLeds(targets, colour) => {
            if targets.as_slice() != buttons {
                return Err(EncodeError::LedButtonsMismatch);
            }
            Ok(format!("{TAG_LEDS}{}", encode_colour(colour)))
        }
    }
}

/// Parses `r*g*b` or `r*g*b*brightness`.
pub fn decode_colour(value: &str) -> Result<Colour, String> {
    let invalid = |detail: &str| format!("Invalid RGB value {value} ({detail})");

    let parts: Vec<&str> = value.split('*').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(invalid("expected 3 or 4 parts"));
    }

    let mut channels = [0u8; 3];
    for (channel, part) in channels.iter_mut().zip(&parts) {
        *channel = part.parse().map_err(|_| invalid(&format!("bad channel {part}")))?;
    }
    let brightness = match parts.get(3) {
        Some(part) => Some(part.parse::<f32>().map_err(|_| invalid(&format!("bad brightness {part}")))?),
        None => None,
    };

    Ok(Colour { r: channels[0], g: channels[1], b: channels[2], brightness })
}

pub fn encode_colour(colour: &Colour) -> String {
    match colour.brightness {
        Some(brightness) => format!("{}*{}*{}*{brightness}", colour.r, colour.g, colour.b),
        None => format!("{}*{}*{}", colour.r, colour.g, colour.b),
    }
}

/// Seconds with up to nine fractional digits, trailing zeros dropped.
fn encode_secs(duration: Duration) -> String {
    let (secs, nanos) = (duration.as_secs(), duration.subsec_nanos());
    if nanos == 0 {
        return secs.to_string();
    }
    let fraction = format!("{nanos:09}");
    format!("{secs}.{}", fraction.trim_end_matches('0'))
}

/// Plain decimals are parsed digit by digit so nanoseconds survive; anything
/// else (exponents, signs) goes through `f64`.
fn decode_sleep(payload: &str) -> Result<Duration, String> {
    decode_decimal_secs(payload)
        .or_else(|| {
            payload.parse::<f64>().ok().and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        })
        .ok_or_else(|| format!("invalid sleep duration {payload}"))
}

fn decode_decimal_secs(payload: &str) -> Option<Duration> {
    let (whole, fraction) = payload.split_once('.').unwrap_or((payload, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits(whole) || !digits(fraction) {
        return None;
    }
    if fraction.len() > 9 {
        return None;
    }

    let secs = if whole.is_empty() { 0 } else { whole.parse::<u64>().ok()? };
    let nanos = if fraction.is_empty() {
        0
    } else {
        let scale = 10u32.pow(9 - u32::try_from(fraction.len()).ok()?);
        fraction.parse::<u32>().ok()? * scale
    };
    Some(Duration::new(secs, nanos))
}

fn decode_text(payload: &str, version: ProtocolVersion) -> Result<String, String> {
    match version {
        ProtocolVersion::V1 => Ok(payload.to_string()),
        ProtocolVersion::V2 => hex::decode(payload)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| format!("invalid hex text {payload}")),
    }
}

fn encode_text(text: &str, version: ProtocolVersion) -> Result<String, EncodeError> {
    let unencodable = || EncodeError::UnencodableText { text: text.to_string(), version };
    if text.is_empty() {
        return Err(unencodable());
    }
    match version {
        ProtocolVersion::V1 => {
            // Lines are trimmed on receipt, so trailing whitespace would not survive.
            if text.contains(V1_RESERVED) || text.ends_with(char::is_whitespace) {
                return Err(unencodable());
            }
            Ok(text.to_string())
        }
        ProtocolVersion::V2 => Ok(hex::encode(text.as_bytes())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_tag() {
        let v1 = ProtocolVersion::V1;
        assert_eq!(
            decode_action("s0.2", &[0], v1),
            Ok(KeyAction::Sleep(Duration::from_millis(200)))
        );
        assert_eq!(
            decode_action("kCOMMAND|T", &[0], v1),
            Ok(KeyAction::PressKeys(vec![Keycode::Command, Keycode::T]))
        );
        assert_eq!(decode_action("wfirefox", &[0], v1), Ok(KeyAction::write("firefox")));
        assert_eq!(
            decode_action("l0*0*0", &[4, 5], v1),
            Ok(KeyAction::SetLeds(vec![4, 5], Colour::OFF))
        );
    }

    #[test]
    fn v2_text_is_hex() {
        let v2 = ProtocolVersion::V2;
        assert_eq!(
            encode_action(&KeyAction::write("a/b,c"), &[0], v2),
            Ok("w612f622c63".to_string())
        );
        assert_eq!(decode_action("w612f622c63", &[0], v2), Ok(KeyAction::write("a/b,c")));
        assert!(decode_action("wzz", &[0], v2).is_err());
        assert!(decode_action("wfff", &[0], v2).is_err());
    }

    #[test]
    fn v1_rejects_reserved_characters() {
        let err = encode_action(&KeyAction::write("a/b"), &[0], ProtocolVersion::V1).unwrap_err();
        assert!(matches!(err, EncodeError::UnencodableText { .. }));
    }

    #[test]
    fn short_and_unknown_actions_fail() {
        let v1 = ProtocolVersion::V1;
        assert_eq!(decode_action("s", &[0], v1), Err("key command not long enough: s".to_string()));
        assert_eq!(decode_action("", &[0], v1), Err("key command not long enough: ".to_string()));
        assert_eq!(decode_action("x12", &[0], v1), Err("unknown key command x12".to_string()));
        assert_eq!(decode_action("kHYPER", &[0], v1), Err("invalid keycode HYPER".to_string()));
    }

    #[test]
    fn sleep_rejects_negative_and_nan() {
        let v1 = ProtocolVersion::V1;
        assert!(decode_action("s-1", &[0], v1).is_err());
        assert!(decode_action("sNaN", &[0], v1).is_err());
        assert!(decode_action("sabc", &[0], v1).is_err());
    }

    #[test]
    fn sleep_keeps_nanosecond_precision() {
        let v2 = ProtocolVersion::V2;
        let duration = Duration::new(8_441_654, 111_641_114);
        let encoded = encode_action(&KeyAction::Sleep(duration), &[0], v2).unwrap();
        assert_eq!(encoded, "s8441654.111641114");
        assert_eq!(decode_action(&encoded, &[0], v2), Ok(KeyAction::Sleep(duration)));

        assert_eq!(encode_secs(Duration::from_millis(200)), "0.2");
        assert_eq!(encode_secs(Duration::from_secs(1)), "1");
        assert_eq!(encode_secs(Duration::from_nanos(1)), "0.000000001");
    }

    #[test]
    fn sleep_accepts_float_spellings() {
        let v1 = ProtocolVersion::V1;
        assert_eq!(decode_action("s.5", &[0], v1), Ok(KeyAction::Sleep(Duration::from_millis(500))));
        assert_eq!(decode_action("s2.", &[0], v1), Ok(KeyAction::Sleep(Duration::from_secs(2))));
        assert_eq!(decode_action("s5e-1", &[0], v1), Ok(KeyAction::Sleep(Duration::from_millis(500))));
        assert_eq!(decode_action("s+1", &[0], v1), Ok(KeyAction::Sleep(Duration::from_secs(1))));
        assert!(decode_action("s.", &[0], v1).is_err());
        assert!(decode_action("sinf", &[0], v1).is_err());
    }

    #[test]
    fn colour_parts_and_ranges() {
        assert_eq!(decode_colour("10*20*30"), Ok(Colour::rgb(10, 20, 30)));
        assert_eq!(
            decode_colour("10*20*30*0.5"),
            Ok(Colour::rgb(10, 20, 30).with_brightness(0.5))
        );
        assert!(decode_colour("1*2").is_err());
        assert!(decode_colour("1*2*3*4*5").is_err());
        assert!(decode_colour("256*0*0").is_err());
        assert!(decode_colour("-1*0*0").is_err());
    }

    #[test]
    fn led_action_must_target_keyset_buttons() {
        let action = KeyAction::SetLeds(vec![1], Colour::OFF);
        assert_eq!(encode_action(&action, &[1], ProtocolVersion::V2), Ok("l0*0*0".to_string()));
        assert_eq!(
            encode_action(&action, &[2], ProtocolVersion::V2),
            Err(EncodeError::LedButtonsMismatch)
        );
    }
}
