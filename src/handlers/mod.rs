//! Handler implementations

#[cfg(feature = "json")]
pub mod json;
#[cfg(feature = "pretty")]
pub mod pretty;

#[cfg(feature = "json")]
pub use json::{JsonHandler, MessageType};
#[cfg(feature = "pretty")]
pub use pretty::PrettyHandler;

pub use crate::core::Handler;
