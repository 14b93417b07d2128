//! Interval polling fallback.
//!
//! Shipments are refreshed on a fixed interval through the HTTP API,
//! regardless of push-channel health: push delivery has no redelivery
//! guarantee, so the cadence is what recovers a lost event. Terminal
//! shipments are skipped and per-shipment refreshes run concurrently.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::{debug, warn};

use shiptrack_core::config::client::ClientConfig;
use shiptrack_core::error::{AppError, ErrorKind};
use shiptrack_core::result::AppResult;
use shiptrack_entity::Shipment;

use crate::reconcile::Reconciler;

/// Result of the track endpoint: `updated=false` means the server detected
/// no change.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackResult {
    pub updated: bool,
    pub shipment: Shipment,
}

/// HTTP API surface the poller needs.
#[async_trait]
pub trait ShipmentApi: Send + Sync + 'static {
    /// Fetches the full shipment list.
    async fn list_shipments(&self) -> AppResult<Vec<Shipment>>;

    /// Triggers a server-side refresh of one shipment.
    async fn track(&self, tracking_number: &str) -> AppResult<TrackResult>;
}

#[derive(Debug, Deserialize)]
struct ShipmentListResponse {
    shipments: Vec<Shipment>,
}

/// Production implementation against the ShipTrack HTTP API.
#[derive(Debug, Clone)]
pub struct HttpShipmentApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpShipmentApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    async fn check(response: reqwest::Response) -> AppResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "API returned status {status}"
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ShipmentApi for HttpShipmentApi {
    async fn list_shipments(&self) -> AppResult<Vec<Shipment>> {
        let response = self
            .http
            .get(format!("{}/api/shipments", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ServiceUnavailable, "List request failed", e)
            })?;

        let body: ShipmentListResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Serialization, "Failed to decode shipment list", e)
            })?;
        Ok(body.shipments)
    }

    async fn track(&self, tracking_number: &str) -> AppResult<TrackResult> {
        let response = self
            .http
            .post(format!(
                "{}/api/shipments/{tracking_number}/track",
                self.base_url
            ))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ServiceUnavailable, "Track request failed", e)
            })?;

        Self::check(response).await?.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Serialization, "Failed to decode track result", e)
        })
    }
}

/// Drives the fallback refresh loop.
pub struct ShipmentPoller<A: ShipmentApi> {
    api: Arc<A>,
    reconciler: Arc<Reconciler>,
    interval: Duration,
}

impl<A: ShipmentApi> ShipmentPoller<A> {
    pub fn new(api: Arc<A>, reconciler: Arc<Reconciler>, config: &ClientConfig) -> Self {
        Self {
            api,
            reconciler,
            interval: Duration::from_secs(config.poll_interval_seconds),
        }
    }

    /// Runs the polling loop until shutdown. Every tick runs a cycle even
    /// while the push channel is connected: a pushed event lost in flight is
    /// picked up by the next cycle, and the reconciler keeps redundant
    /// refreshes silent.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The immediate first tick would race the channel handshake.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    /// Refreshes every pollable shipment concurrently.
    pub async fn run_cycle(&self) {
        let tracking_numbers = self.reconciler.pollable_tracking_numbers();
        if tracking_numbers.is_empty() {
            return;
        }

        debug!(count = tracking_numbers.len(), "Running poll cycle");

        let refreshes = tracking_numbers.into_iter().map(|tracking_number| {
            let api = self.api.clone();
            let reconciler = self.reconciler.clone();
            async move {
                reconciler.set_refreshing(&tracking_number, true);
                match api.track(&tracking_number).await {
                    Ok(result) => reconciler.apply_poll(result),
                    Err(e) => {
                        warn!(tracking_number, error = %e, "Poll refresh failed");
                    }
                }
                reconciler.set_refreshing(&tracking_number, false);
            }
        });

        join_all(refreshes).await;
    }
}
