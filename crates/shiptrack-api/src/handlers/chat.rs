//! Assistant chat handler.

use axum::extract::State;
use axum::Json;

use crate::dto::request::ChatRequest;
use crate::dto::response::ChatResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::handlers::validate;
use crate::state::AppState;

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    validate(&req)?;

    let reply = state
        .assistant_service
        .chat(auth.user_id, &req.message)
        .await?;
    Ok(Json(ChatResponse { reply }))
}
