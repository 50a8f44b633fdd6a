//! HID keyboard keycodes understood by the panel
//!
//! Names follow the device keyboard library so that a `k` action written by
//! hand (`kCOMMAND|T`) reads the same on both sides of the link. Several
//! names are aliases for one usage id (`RETURN`/`ENTER`, `COMMAND`/`GUI`).

use serde::{Deserialize, Serialize};

macro_rules! define_keycodes {
    ($($variant:ident => $name:literal = $usage:literal),+ $(,)?) => {
        /// A named key on a HID keyboard.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Keycode {
            $($variant),+
        }

        crate::impl_name_conversions!(Keycode {
            $($variant => $name),+
        });

        impl Keycode {
            /// HID usage id sent in the keyboard report.
            pub const fn usage_id(&self) -> u8 {
                match self {
                    $(Self::$variant => $usage,)+
                }
            }
        }
    };
}

define_keycodes! {
    A => "A" = 0x04,
    B => "B" = 0x05,
    C => "C" = 0x06,
    D => "D" = 0x07,
    E => "E" = 0x08,
    F => "F" = 0x09,
    G => "G" = 0x0A,
    H => "H" = 0x0B,
    I => "I" = 0x0C,
    J => "J" = 0x0D,
    K => "K" = 0x0E,
    L => "L" = 0x0F,
    M => "M" = 0x10,
    N => "N" = 0x11,
    O => "O" = 0x12,
    P => "P" = 0x13,
    Q => "Q" = 0x14,
    R => "R" = 0x15,
    S => "S" = 0x16,
    T => "T" = 0x17,
    U => "U" = 0x18,
    V => "V" = 0x19,
    W => "W" = 0x1A,
    X => "X" = 0x1B,
    Y => "Y" = 0x1C,
    Z => "Z" = 0x1D,
    One => "ONE" = 0x1E,
    Two => "TWO" = 0x1F,
    Three => "THREE" = 0x20,
    Four => "FOUR" = 0x21,
    Five => "FIVE" = 0x22,
    Six => "SIX" = 0x23,
    Seven => "SEVEN" = 0x24,
    Eight => "EIGHT" = 0x25,
    Nine => "NINE" = 0x26,
    Zero => "ZERO" = 0x27,
    Enter => "ENTER" = 0x28,
    Return => "RETURN" = 0x28,
    Escape => "ESCAPE" = 0x29,
    Backspace => "BACKSPACE" = 0x2A,
    Tab => "TAB" = 0x2B,
    Spacebar => "SPACEBAR" = 0x2C,
    Space => "SPACE" = 0x2C,
    Minus => "MINUS" = 0x2D,
    Equals => "EQUALS" = 0x2E,
    LeftBracket => "LEFT_BRACKET" = 0x2F,
    RightBracket => "RIGHT_BRACKET" = 0x30,
    Backslash => "BACKSLASH" = 0x31,
    Pound => "POUND" = 0x32,
    Semicolon => "SEMICOLON" = 0x33,
    Quote => "QUOTE" = 0x34,
    GraveAccent => "GRAVE_ACCENT" = 0x35,
    Comma => "COMMA" = 0x36,
    Period => "PERIOD" = 0x37,
    ForwardSlash => "FORWARD_SLASH" = 0x38,
    CapsLock => "CAPS_LOCK" = 0x39,
    F1 => "F1" = 0x3A,
    F2 => "F2" = 0x3B,
    F3 => "F3" = 0x3C,
    F4 => "F4" = 0x3D,
    F5 => "F5" = 0x3E,
    F6 => "F6" = 0x3F,
    F7 => "F7" = 0x40,
    F8 => "F8" = 0x41,
    F9 => "F9" = 0x42,
    F10 => "F10" = 0x43,
    F11 => "F11" = 0x44,
    F12 => "F12" = 0x45,
    PrintScreen => "PRINT_SCREEN" = 0x46,
    ScrollLock => "SCROLL_LOCK" = 0x47,
    Pause => "PAUSE" = 0x48,
    Insert => "INSERT" = 0x49,
    Home => "HOME" = 0x4A,
    PageUp => "PAGE_UP" = 0x4B,
    Delete => "DELETE" = 0x4C,
    End => "END" = 0x4D,
    PageDown => "PAGE_DOWN" = 0x4E,
    RightArrow => "RIGHT_ARROW" = 0x4F,
    LeftArrow => "LEFT_ARROW" = 0x50,
    DownArrow => "DOWN_ARROW" = 0x51,
    UpArrow => "UP_ARROW" = 0x52,
    LeftControl => "LEFT_CONTROL" = 0xE0,
    Control => "CONTROL" = 0xE0,
    LeftShift => "LEFT_SHIFT" = 0xE1,
    Shift => "SHIFT" = 0xE1,
    LeftAlt => "LEFT_ALT" = 0xE2,
    Alt => "ALT" = 0xE2,
    Option => "OPTION" = 0xE2,
    LeftGui => "LEFT_GUI" = 0xE3,
    Gui => "GUI" = 0xE3,
    Windows => "WINDOWS" = 0xE3,
    Command => "COMMAND" = 0xE3,
    RightControl => "RIGHT_CONTROL" = 0xE4,
    RightShift => "RIGHT_SHIFT" = 0xE5,
    RightAlt => "RIGHT_ALT" = 0xE6,
    RightGui => "RIGHT_GUI" = 0xE7,
}

impl Keycode {
    /// Whether this key is a modifier (held rather than tapped).
    pub const fn is_modifier(&self) -> bool {
        self.usage_id() >= 0xE0
    }
}
