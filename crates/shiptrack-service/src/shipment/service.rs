//! Shipment creation, listing, and removal.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use shiptrack_carrier::CarrierClient;
use shiptrack_core::error::AppError;
use shiptrack_core::result::AppResult;
use shiptrack_database::repositories::shipment::ShipmentRepository;
use shiptrack_entity::shipment::model::CreateShipment;
use shiptrack_entity::Shipment;

use crate::events::{ShipmentEvent, UpdatePublisher};

/// Data for registering a new shipment.
#[derive(Debug, Clone)]
pub struct NewShipmentRequest {
    pub tracking_number: String,
    pub description: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
}

/// Manages the shipment list for each user.
#[derive(Clone)]
pub struct ShipmentService {
    shipment_repo: Arc<ShipmentRepository>,
    carrier: Arc<CarrierClient>,
    publisher: Arc<dyn UpdatePublisher>,
}

impl ShipmentService {
    pub fn new(
        shipment_repo: Arc<ShipmentRepository>,
        carrier: Arc<CarrierClient>,
        publisher: Arc<dyn UpdatePublisher>,
    ) -> Self {
        Self {
            shipment_repo,
            carrier,
            publisher,
        }
    }

    /// Lists all shipments owned by the user, newest first.
    pub async fn list_shipments(&self, user_id: Uuid) -> AppResult<Vec<Shipment>> {
        self.shipment_repo.find_by_user(user_id).await
    }

    /// Gets one shipment by tracking number, scoped to the owner.
    pub async fn get_shipment(
        &self,
        user_id: Uuid,
        tracking_number: &str,
    ) -> AppResult<Shipment> {
        self.shipment_repo
            .find_by_tracking(user_id, tracking_number)
            .await?
            .ok_or_else(|| AppError::not_found("Shipment not found"))
    }

    /// Registers a new shipment and emits a `new_shipment` event.
    ///
    /// The carrier lookup is best-effort: the shipment is stored with status
    /// "Processing" and no carrier if the lookup fails, and the background
    /// refresh fills the gap later.
    pub async fn add_shipment(
        &self,
        user_id: Uuid,
        req: NewShipmentRequest,
    ) -> AppResult<Shipment> {
        let tracking_number = req.tracking_number.trim().to_string();
        if tracking_number.is_empty() {
            return Err(AppError::validation("Tracking number is required"));
        }

        if self
            .shipment_repo
            .find_by_tracking(user_id, &tracking_number)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Shipment already exists"));
        }

        let tracking_info = match self.carrier.get_tracking_info(&tracking_number).await {
            Ok(info) => info,
            Err(e) => {
                warn!(%user_id, tracking_number, error = %e, "Carrier lookup failed during add; storing without carrier data");
                None
            }
        };

        let shipment = self
            .shipment_repo
            .create(&CreateShipment {
                user_id,
                tracking_number,
                carrier: tracking_info.as_ref().and_then(|t| t.carrier.clone()),
                description: req.description,
                origin: req.origin.or_else(|| {
                    tracking_info.as_ref().and_then(|t| t.origin.clone())
                }),
                destination: req.destination.or_else(|| {
                    tracking_info.as_ref().and_then(|t| t.destination.clone())
                }),
                status: "Processing".to_string(),
            })
            .await?;

        info!(%user_id, tracking_number = %shipment.tracking_number, "Shipment added");

        self.publisher
            .notify(user_id, ShipmentEvent::new_shipment(shipment.clone()))
            .await;

        Ok(shipment)
    }

    /// Removes a shipment owned by the user.
    pub async fn remove_shipment(&self, user_id: Uuid, tracking_number: &str) -> AppResult<()> {
        let removed = self.shipment_repo.delete(user_id, tracking_number).await?;
        if !removed {
            return Err(AppError::not_found("Shipment not found"));
        }

        info!(%user_id, tracking_number, "Shipment removed");
        Ok(())
    }
}
