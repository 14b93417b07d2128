//! Auth handlers — register, login, me.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::AuthResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::handlers::validate;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    validate(&req)?;

    let result = state
        .account_service
        .register(
            &req.username,
            &req.email,
            &req.password,
            req.company_name,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: result.token,
            expires_at: result.expires_at,
            user: result.user.profile(),
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate(&req)?;

    let result = state
        .account_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(AuthResponse {
        token: result.token,
        expires_at: result.expires_at,
        user: result.user.profile(),
    }))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "id": auth.user_id,
        "username": auth.username,
    }))
}
