//! Health check handler.

use axum::extract::State;
use axum::Json;

use shiptrack_database::connection;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = connection::health_check(&state.db_pool).await.is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" }.to_string(),
        database,
        connections: state.realtime.manager().connection_count(),
    })
}
