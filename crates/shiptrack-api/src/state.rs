//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use shiptrack_auth::jwt::decoder::JwtDecoder;
use shiptrack_core::config::AppConfig;
use shiptrack_realtime::server::RealtimeEngine;
use shiptrack_service::account::service::AccountService;
use shiptrack_service::assistant::service::AssistantService;
use shiptrack_service::shipment::service::ShipmentService;
use shiptrack_service::tracking::service::TrackingService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health checks).
    pub db_pool: PgPool,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Realtime push engine.
    pub realtime: Arc<RealtimeEngine>,
    /// Registration and login.
    pub account_service: Arc<AccountService>,
    /// Shipment CRUD.
    pub shipment_service: Arc<ShipmentService>,
    /// On-demand refresh.
    pub tracking_service: Arc<TrackingService>,
    /// Logistics assistant chat.
    pub assistant_service: Arc<AssistantService>,
}
