//! On-demand shipment refresh.

use std::sync::Arc;

use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use shiptrack_carrier::CarrierClient;
use shiptrack_core::error::AppError;
use shiptrack_core::result::AppResult;
use shiptrack_database::repositories::shipment::ShipmentRepository;
use shiptrack_entity::Shipment;

use crate::events::{ShipmentEvent, UpdatePublisher};
use crate::tracking::detect::{detect_change, Detection};

/// Result of a track operation.
///
/// `updated=false` means the poll completed but no change was detected; the
/// client must not raise a notification in that case.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrackOutcome {
    pub updated: bool,
    pub shipment: Shipment,
}

/// Refreshes shipments against the carrier and emits change events.
#[derive(Clone)]
pub struct TrackingService {
    shipment_repo: Arc<ShipmentRepository>,
    carrier: Arc<CarrierClient>,
    publisher: Arc<dyn UpdatePublisher>,
    /// Per-shipment refresh locks. Serializing refreshes per shipment keeps
    /// detection order equal to delivery order for that shipment; refreshes
    /// of different shipments proceed concurrently.
    locks: Arc<DashMap<(Uuid, String), Arc<Mutex<()>>>>,
}

impl TrackingService {
    pub fn new(
        shipment_repo: Arc<ShipmentRepository>,
        carrier: Arc<CarrierClient>,
        publisher: Arc<dyn UpdatePublisher>,
    ) -> Self {
        Self {
            shipment_repo,
            carrier,
            publisher,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Polls the carrier for one shipment and persists any detected change.
    ///
    /// Emits exactly one `status_change` event per detected change, to the
    /// owner's channels only. Returns the (possibly updated) record either
    /// way.
    pub async fn refresh_shipment(
        &self,
        user_id: Uuid,
        tracking_number: &str,
    ) -> AppResult<TrackOutcome> {
        let lock = self.shipment_lock(user_id, tracking_number);
        let _guard = lock.lock().await;

        let stored = self
            .shipment_repo
            .find_by_tracking(user_id, tracking_number)
            .await?
            .ok_or_else(|| AppError::not_found("Shipment not found"))?;

        let info = self.carrier.get_tracking_info(tracking_number).await?;

        let Some(info) = info else {
            debug!(%user_id, tracking_number, "Carrier returned no data; keeping stored status");
            return Ok(TrackOutcome {
                updated: false,
                shipment: stored,
            });
        };

        match detect_change(&stored.status, &info.status) {
            Detection::Unchanged => Ok(TrackOutcome {
                updated: false,
                shipment: stored,
            }),
            Detection::Changed(new_status) => {
                let updated = self
                    .shipment_repo
                    .update_status(
                        stored.id,
                        &new_status,
                        info.carrier.as_deref(),
                        info.estimated_delivery,
                    )
                    .await?;

                info!(
                    %user_id,
                    tracking_number,
                    from = %stored.status,
                    to = %updated.status,
                    "Shipment status changed"
                );

                self.publisher
                    .notify(user_id, ShipmentEvent::status_change(updated.clone()))
                    .await;

                Ok(TrackOutcome {
                    updated: true,
                    shipment: updated,
                })
            }
        }
    }

    /// Refreshes every non-terminal shipment of every user.
    ///
    /// Used by the background worker. Refreshes run concurrently up to
    /// `concurrency`; per-shipment failures are logged and skipped so one
    /// bad tracking number cannot stall the cycle. Returns the number of
    /// shipments whose status changed.
    pub async fn refresh_all_active(&self, concurrency: usize) -> AppResult<usize> {
        let active = self.shipment_repo.find_active().await?;
        let total = active.len();

        let results = stream::iter(active)
            .map(|shipment| {
                let service = self.clone();
                async move {
                    service
                        .refresh_shipment(shipment.user_id, &shipment.tracking_number)
                        .await
                        .map_err(|e| {
                            tracing::warn!(
                                user_id = %shipment.user_id,
                                tracking_number = %shipment.tracking_number,
                                error = %e,
                                "Refresh failed for shipment; continuing cycle"
                            );
                        })
                }
            })
            .buffer_unordered(concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let changed = results
            .iter()
            .filter(|r| matches!(r, Ok(outcome) if outcome.updated))
            .count();

        debug!(total, changed, "Background refresh cycle finished");
        Ok(changed)
    }

    fn shipment_lock(&self, user_id: Uuid, tracking_number: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry((user_id, tracking_number.to_string()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
