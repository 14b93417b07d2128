//! Wire message types for the push channel.

pub mod types;

pub use types::{InboundMessage, OutboundMessage};
