//! # Notifier Device
//!
//! The panel side of the link: a command interpreter owning the LED buffer
//! and keyset table, driven by a fixed-period tick loop.
//!
//! Hardware access goes through [`DeviceIo`], so the same interpreter runs on
//! the panel firmware, in the stdin/stdout simulator, and in tests.

pub mod interpreter;
pub mod io;
pub mod reply;
pub mod report;

pub use interpreter::{run, Interpreter};
pub use io::DeviceIo;
pub use reply::Reply;
pub use report::keyboard_report;
