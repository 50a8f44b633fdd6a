//! Event dispatch onto the panel

pub mod dispatcher;
pub mod error;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
