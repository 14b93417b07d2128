//! Repository implementations.

pub mod shipment;
pub mod user;
