//! Wire types for the Ship24 tracking API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized result of a carrier lookup.
///
/// This is the shape the rest of the system consumes; the raw API response
/// is flattened here by [`CarrierClient`](crate::client::CarrierClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub tracking_number: String,
    /// Carrier slug reported by the API, if known.
    pub carrier: Option<String>,
    /// Conventional status string (see [`normalize`](crate::normalize)).
    pub status: String,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

/// Top-level envelope on every Ship24 response.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    pub data: ApiData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiData {
    #[serde(default)]
    pub trackings: Vec<ApiTracking>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiTracking {
    pub tracker: ApiTracker,
    pub shipment: Option<ApiShipment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiTracker {
    pub tracking_number: String,
    #[serde(default)]
    pub courier_code: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiShipment {
    pub status_milestone: Option<String>,
    pub origin_country_code: Option<String>,
    pub destination_country_code: Option<String>,
    pub delivery: Option<ApiDelivery>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiDelivery {
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

/// Body of the register-and-track request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackRequest<'a> {
    pub tracking_number: &'a str,
}
