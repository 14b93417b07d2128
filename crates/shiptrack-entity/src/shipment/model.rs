//! Shipment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::ShipmentStatus;

/// A tracked shipment owned by a single user.
///
/// The tracking number is immutable after creation; status is free text
/// because carriers report out-of-order and corrected values, so the store
/// does not enforce a state machine.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Carrier tracking number (immutable, unique per user).
    pub tracking_number: String,
    /// Carrier name, if known.
    pub carrier: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Origin location.
    pub origin: Option<String>,
    /// Destination location.
    pub destination: Option<String>,
    /// Current status as reported by the carrier.
    pub status: String,
    /// Estimated delivery time, if the carrier provides one.
    pub estimated_delivery: Option<DateTime<Utc>>,
    /// When the shipment was registered.
    pub created_at: DateTime<Utc>,
    /// When the status was last refreshed. Never regresses.
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    /// Classify the current raw status.
    pub fn status_category(&self) -> ShipmentStatus {
        ShipmentStatus::classify(&self.status)
    }

    /// Check whether the shipment has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status_category().is_terminal()
    }
}

/// Data required to register a new shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShipment {
    /// Owning user.
    pub user_id: Uuid,
    /// Carrier tracking number.
    pub tracking_number: String,
    /// Carrier name, if known at creation time.
    pub carrier: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Origin location.
    pub origin: Option<String>,
    /// Destination location.
    pub destination: Option<String>,
    /// Initial status.
    pub status: String,
}
