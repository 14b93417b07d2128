//! Route definitions for the ShipTrack HTTP API.
//!
//! All routes are mounted under `/api`, plus the WebSocket upgrade at `/ws`.
//! The router receives `AppState` and threads it through every handler via
//! Axum's `State` extractor.

use axum::http::{HeaderValue, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(shipment_routes())
        .merge(chat_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Auth endpoints: register, login, me.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Shipment CRUD and on-demand refresh.
fn shipment_routes() -> Router<AppState> {
    Router::new()
        .route("/shipments", get(handlers::shipment::list_shipments))
        .route("/shipments", post(handlers::shipment::add_shipment))
        .route(
            "/shipments/{tracking_number}",
            get(handlers::shipment::get_shipment),
        )
        .route(
            "/shipments/{tracking_number}",
            delete(handlers::shipment::remove_shipment),
        )
        .route(
            "/shipments/{tracking_number}/track",
            post(handlers::shipment::track_shipment),
        )
}

/// Assistant chat.
fn chat_routes() -> Router<AppState> {
    Router::new().route("/chat", post(handlers::chat::chat))
}

/// Health check.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn build_cors_layer(state: &AppState) -> CorsLayer {
    let cors_config = &state.config.server.cors;

    let origins = if cors_config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors_config
                .allowed_origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok()),
        )
    };

    let methods: Vec<Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(cors_config.max_age_seconds))
}
