//! Shipment handlers — list, add, get, remove, track.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use shiptrack_entity::Shipment;
use shiptrack_service::shipment::service::NewShipmentRequest;

use crate::dto::request::AddShipmentRequest;
use crate::dto::response::{MessageResponse, ShipmentListResponse, TrackResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::handlers::validate;
use crate::state::AppState;

/// GET /api/shipments
pub async fn list_shipments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ShipmentListResponse>, ApiError> {
    let shipments = state.shipment_service.list_shipments(auth.user_id).await?;
    Ok(Json(ShipmentListResponse { shipments }))
}

/// POST /api/shipments
pub async fn add_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AddShipmentRequest>,
) -> Result<(StatusCode, Json<Shipment>), ApiError> {
    validate(&req)?;

    let shipment = state
        .shipment_service
        .add_shipment(
            auth.user_id,
            NewShipmentRequest {
                tracking_number: req.tracking_number,
                description: req.description,
                origin: req.origin,
                destination: req.destination,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(shipment)))
}

/// GET /api/shipments/{tracking_number}
pub async fn get_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tracking_number): Path<String>,
) -> Result<Json<Shipment>, ApiError> {
    let shipment = state
        .shipment_service
        .get_shipment(auth.user_id, &tracking_number)
        .await?;
    Ok(Json(shipment))
}

/// DELETE /api/shipments/{tracking_number}
pub async fn remove_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tracking_number): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .shipment_service
        .remove_shipment(auth.user_id, &tracking_number)
        .await?;
    Ok(Json(MessageResponse {
        message: "Shipment removed".to_string(),
    }))
}

/// POST /api/shipments/{tracking_number}/track
pub async fn track_shipment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackResponse>, ApiError> {
    let outcome = state
        .tracking_service
        .refresh_shipment(auth.user_id, &tracking_number)
        .await?;
    Ok(Json(TrackResponse {
        updated: outcome.updated,
        shipment: outcome.shipment,
    }))
}
