//! HTTP and WebSocket handlers.

pub mod auth;
pub mod chat;
pub mod health;
pub mod shipment;
pub mod ws;

use validator::Validate;

use shiptrack_core::error::AppError;

use crate::error::ApiError;

/// Runs DTO validation, collapsing the first failure into a 400.
pub(crate) fn validate<T: Validate>(req: &T) -> Result<(), ApiError> {
    req.validate()
        .map_err(|e| ApiError(AppError::validation(e.to_string())))
}
