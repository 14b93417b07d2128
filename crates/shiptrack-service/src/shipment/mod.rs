//! Shipment CRUD.

pub mod service;

pub use service::{NewShipmentRequest, ShipmentService};
