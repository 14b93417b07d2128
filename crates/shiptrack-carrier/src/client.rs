//! HTTP client for the Ship24 tracking API.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

use shiptrack_core::config::carrier::CarrierConfig;
use shiptrack_core::error::{AppError, ErrorKind};
use shiptrack_core::result::AppResult;

use crate::normalize::status_from_milestone;
use crate::types::{ApiResponse, ApiTracking, TrackRequest, TrackingInfo};

/// Client for the Ship24 public API.
#[derive(Debug, Clone)]
pub struct CarrierClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CarrierClient {
    pub fn new(config: &CarrierConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build carrier HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Registers a tracker for the number and returns its current state.
    ///
    /// Used when a shipment is first added, so the carrier starts following
    /// the parcel on our behalf.
    pub async fn track_shipment(&self, tracking_number: &str) -> AppResult<Option<TrackingInfo>> {
        let url = format!("{}/trackers/track", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&TrackRequest { tracking_number })
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Carrier tracking request failed", e)
            })?;

        self.parse_response(tracking_number, response).await
    }

    /// Looks up the current state of an already-registered tracking number.
    pub async fn get_tracking_info(&self, tracking_number: &str) -> AppResult<Option<TrackingInfo>> {
        let url = format!("{}/trackers/search", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("trackingNumbers", tracking_number)])
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Carrier lookup request failed", e)
            })?;

        self.parse_response(tracking_number, response).await
    }

    async fn parse_response(
        &self,
        tracking_number: &str,
        response: reqwest::Response,
    ) -> AppResult<Option<TrackingInfo>> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(tracking_number, "Carrier has no record for tracking number");
            return Ok(None);
        }
        if !status.is_success() {
            warn!(tracking_number, %status, "Carrier API returned an error status");
            return Err(AppError::external_service(format!(
                "Carrier API returned status {status}"
            )));
        }

        let body: ApiResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Failed to decode carrier API response",
                e,
            )
        })?;

        Ok(body
            .data
            .trackings
            .into_iter()
            .next()
            .map(Self::flatten_tracking))
    }

    fn flatten_tracking(tracking: ApiTracking) -> TrackingInfo {
        let shipment = tracking.shipment;
        let status = shipment
            .as_ref()
            .and_then(|s| s.status_milestone.as_deref())
            .map(status_from_milestone)
            .unwrap_or_else(|| "Processing".to_string());

        TrackingInfo {
            tracking_number: tracking.tracker.tracking_number,
            carrier: tracking.tracker.courier_code.into_iter().next(),
            status,
            origin: shipment.as_ref().and_then(|s| s.origin_country_code.clone()),
            destination: shipment
                .as_ref()
                .and_then(|s| s.destination_country_code.clone()),
            estimated_delivery: shipment
                .and_then(|s| s.delivery)
                .and_then(|d| d.estimated_delivery_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApiDelivery, ApiShipment, ApiTracker};

    #[test]
    fn test_flatten_tracking_full_record() {
        let tracking = ApiTracking {
            tracker: ApiTracker {
                tracking_number: "1Z999AA10123456784".to_string(),
                courier_code: vec!["ups".to_string()],
            },
            shipment: Some(ApiShipment {
                status_milestone: Some("in_transit".to_string()),
                origin_country_code: Some("CN".to_string()),
                destination_country_code: Some("US".to_string()),
                delivery: Some(ApiDelivery {
                    estimated_delivery_date: None,
                }),
            }),
        };

        let info = CarrierClient::flatten_tracking(tracking);
        assert_eq!(info.tracking_number, "1Z999AA10123456784");
        assert_eq!(info.carrier.as_deref(), Some("ups"));
        assert_eq!(info.status, "In Transit");
        assert_eq!(info.origin.as_deref(), Some("CN"));
    }

    #[test]
    fn test_flatten_tracking_without_shipment_defaults_to_processing() {
        let tracking = ApiTracking {
            tracker: ApiTracker {
                tracking_number: "ABC123".to_string(),
                courier_code: vec![],
            },
            shipment: None,
        };

        let info = CarrierClient::flatten_tracking(tracking);
        assert_eq!(info.status, "Processing");
        assert!(info.carrier.is_none());
    }
}
