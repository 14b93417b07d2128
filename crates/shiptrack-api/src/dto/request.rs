//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Company name (optional).
    pub company_name: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Add shipment request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddShipmentRequest {
    /// Carrier tracking number.
    #[validate(length(min = 1, max = 100, message = "Tracking number is required"))]
    pub tracking_number: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Origin location.
    pub origin: Option<String>,
    /// Destination location.
    pub destination: Option<String>,
}

/// Assistant chat request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    /// The user's message.
    #[validate(length(min = 1, max = 4000, message = "Message is required"))]
    pub message: String,
}
