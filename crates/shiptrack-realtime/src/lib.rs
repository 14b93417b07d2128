//! # shiptrack-realtime
//!
//! Server-side push engine for ShipTrack. Provides:
//!
//! - WebSocket connection management with JWT authentication
//! - Per-user rooms (events are never delivered cross-user)
//! - Shipment update broadcast implementing the service layer's
//!   [`UpdatePublisher`](shiptrack_service::UpdatePublisher) seam

pub mod broadcast;
pub mod connection;
pub mod message;
pub mod room;
pub mod server;

pub use broadcast::UpdateBroadcaster;
pub use connection::authenticator::ConnectionAuthenticator;
pub use connection::manager::ConnectionManager;
pub use room::RoomRegistry;
pub use server::RealtimeEngine;
