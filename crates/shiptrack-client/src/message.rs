//! Wire messages for the push channel, client side.
//!
//! These mirror the server's JSON shapes; there is no versioning, the two
//! ends agree per deployment.

use serde::{Deserialize, Serialize};

use shiptrack_entity::Shipment;

/// Messages the client sends.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join { token: String },
    Pong { timestamp: i64 },
}

/// Messages the client receives.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Joined { room: String },
    NewShipment { shipment: Shipment },
    StatusChange { shipment: Shipment },
    Ping { timestamp: i64 },
    Error { code: String, message: String },
}
