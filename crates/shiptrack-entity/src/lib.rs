//! # shiptrack-entity
//!
//! Domain entity models for ShipTrack: users and the shipments they track.

pub mod shipment;
pub mod user;

pub use shipment::model::Shipment;
pub use shipment::status::ShipmentStatus;
pub use user::model::User;
