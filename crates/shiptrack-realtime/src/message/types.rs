//! JSON messages exchanged over the push channel.

use serde::{Deserialize, Serialize};

use shiptrack_entity::Shipment;
use shiptrack_service::{EventKind, ShipmentEvent};

/// Messages from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Join the caller's own room, re-presenting the bearer credential.
    Join { token: String },
    /// Heartbeat response.
    Pong {
        #[serde(default)]
        timestamp: Option<i64>,
    },
}

/// Messages from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Acknowledges a successful join, naming the room.
    Joined { room: String },
    /// A shipment was added.
    NewShipment { shipment: Shipment },
    /// A shipment's status changed.
    StatusChange { shipment: Shipment },
    /// Heartbeat probe.
    Ping { timestamp: i64 },
    /// Protocol or authorization failure.
    Error { code: String, message: String },
}

impl From<ShipmentEvent> for OutboundMessage {
    fn from(event: ShipmentEvent) -> Self {
        match event.kind {
            EventKind::NewShipment => Self::NewShipment {
                shipment: event.shipment,
            },
            EventKind::StatusChange => Self::StatusChange {
                shipment: event.shipment,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_join_parses() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"join","token":"abc.def.ghi"}"#).expect("parse failed");
        assert!(matches!(msg, InboundMessage::Join { token } if token == "abc.def.ghi"));
    }

    #[test]
    fn test_outbound_uses_type_tag() {
        let json = serde_json::to_string(&OutboundMessage::Joined {
            room: "user:42".to_string(),
        })
        .expect("serialize failed");
        assert!(json.contains(r#""type":"joined""#));
        assert!(json.contains(r#""room":"user:42""#));
    }
}
