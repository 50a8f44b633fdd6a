//! Boot-protocol keyboard reports

use notifier_domain::Keycode;
use tracing::warn;

/// Key slots in a boot keyboard report.
pub const REPORT_KEY_SLOTS: usize = 6;

/// First modifier usage id (`LEFT_CONTROL`); modifiers map to bits from here.
const FIRST_MODIFIER_USAGE: u8 = 0xE0;

/// Builds the 8-byte report for keys held together.
///
/// Byte 0 carries the modifier bits, byte 1 is reserved, bytes 2..8 hold up
/// to six non-modifier usage ids. Keys past the sixth are dropped, repeated
/// keys are sent once.
pub fn keyboard_report(keys: &[Keycode]) -> [u8; 8] {
    let mut report = [0u8; 8];
    let mut slot = 0;

    for key in keys {
        let usage = key.usage_id();
        if key.is_modifier() {
            report[0] |= 1 << (usage - FIRST_MODIFIER_USAGE);
        } else if report[2..2 + slot].contains(&usage) {
            continue;
        } else if slot < REPORT_KEY_SLOTS {
            report[2 + slot] = usage;
            slot += 1;
        } else {
            warn!(key = %key, "Keyboard report full; key dropped");
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_set_bits_and_keys_fill_slots() {
        let report = keyboard_report(&[Keycode::Command, Keycode::Shift, Keycode::T]);
        // LEFT_GUI is bit 3, LEFT_SHIFT bit 1.
        assert_eq!(report, [0b0000_1010, 0, 0x17, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn aliases_share_a_slot() {
        let report = keyboard_report(&[Keycode::Enter, Keycode::Return]);
        assert_eq!(report, [0, 0, 0x28, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn keys_beyond_six_are_dropped() {
        let keys = [
            Keycode::A,
            Keycode::B,
            Keycode::C,
            Keycode::D,
            Keycode::E,
            Keycode::F,
            Keycode::G,
        ];
        let report = keyboard_report(&keys);
        assert_eq!(&report[2..], &[0x04, 0x05, 0x06, 0x07, 0x08, 0x09]);
    }
}
