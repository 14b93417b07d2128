//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shiptrack_entity::user::model::UserProfile;
use shiptrack_entity::Shipment;

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Registration/login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}

/// Shipment list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentListResponse {
    pub shipments: Vec<Shipment>,
}

/// Track (on-demand refresh) response. `updated=false` means the poll
/// completed without detecting a change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackResponse {
    pub updated: bool,
    pub shipment: Shipment,
}

/// Assistant chat response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
    pub connections: usize,
}
