//! Shipment update broadcast.

pub mod broadcaster;

pub use broadcaster::UpdateBroadcaster;
