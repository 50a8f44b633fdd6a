//! Wire protocol codec
//!
//! One command per line: `<NAME>:<args>`. Argument fields are separated by
//! `,`, list items by `/`, tuple parts by `*`. Keyset actions are a one-letter
//! tag followed by a payload (`s` sleep, `k` keys, `w` text, `l` LEDs).
//!
//! Encoding and decoding are pure and never touch the serial channel.

pub mod command;
pub mod error;
pub mod keyset;

pub use command::Command;
pub use error::{EncodeError, ParseError};
pub use keyset::{decode_action, encode_action};
