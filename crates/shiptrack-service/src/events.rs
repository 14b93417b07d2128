//! Shipment update events and the publisher seam.
//!
//! Services emit a [`ShipmentEvent`] whenever a new shipment is created or a
//! refresh detects a status change. Delivery is handled behind the
//! [`UpdatePublisher`] trait; the realtime crate provides the production
//! implementation, tests substitute an in-memory one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shiptrack_entity::Shipment;

/// Kind of shipment update. Serialized as the `type` tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewShipment,
    StatusChange,
}

/// A single detected shipment update, scoped to the owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentEvent {
    pub kind: EventKind,
    /// The affected shipment's full current record.
    pub shipment: Shipment,
}

impl ShipmentEvent {
    pub fn new_shipment(shipment: Shipment) -> Self {
        Self {
            kind: EventKind::NewShipment,
            shipment,
        }
    }

    pub fn status_change(shipment: Shipment) -> Self {
        Self {
            kind: EventKind::StatusChange,
            shipment,
        }
    }
}

/// Delivery seam between the services and the realtime layer.
///
/// `notify` is fire-and-forget: implementations must not fail the calling
/// operation when no channel is connected or a send does not go through.
#[async_trait]
pub trait UpdatePublisher: Send + Sync {
    /// Delivers an event to all live channels belonging to `user_id`.
    ///
    /// Events are never delivered cross-user. If the user has no live
    /// channels the event is dropped.
    async fn notify(&self, user_id: Uuid, event: ShipmentEvent);
}
