//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// JWT and password authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign JWT access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in hours.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_hours: u64,
}

fn default_access_ttl() -> u64 {
    // The original deployment issued 7-day tokens.
    168
}
