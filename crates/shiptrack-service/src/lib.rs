//! # shiptrack-service
//!
//! Business logic for ShipTrack. Services here orchestrate the repositories,
//! the carrier client, and auth primitives; the push path reaches the
//! realtime layer through the [`UpdatePublisher`] seam so this crate never
//! depends on a transport.

pub mod account;
pub mod assistant;
pub mod events;
pub mod shipment;
pub mod tracking;

pub use account::AccountService;
pub use assistant::AssistantService;
pub use events::{EventKind, ShipmentEvent, UpdatePublisher};
pub use shipment::ShipmentService;
pub use tracking::TrackingService;
