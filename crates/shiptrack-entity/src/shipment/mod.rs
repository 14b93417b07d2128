//! Shipment entity.

pub mod model;
pub mod status;

pub use model::{CreateShipment, Shipment};
pub use status::ShipmentStatus;
