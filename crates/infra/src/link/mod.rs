//! Host side of the serial link
//!
//! [`HostLink`] runs blocking request/response round trips over any
//! [`SerialChannel`]. [`SerialPanel`] adapts it to the async
//! [`notifier_core::PanelLink`] port.

pub mod channel;
pub mod error;
pub mod host_link;
pub mod panel;
#[cfg(feature = "serial")]
pub mod serial;

pub use channel::{LoopbackChannel, SerialChannel};
pub use error::{LinkError, LinkResult};
pub use host_link::HostLink;
pub use panel::SerialPanel;
#[cfg(feature = "serial")]
pub use serial::SerialPortChannel;
