//! Carrier tracking API configuration.

use serde::{Deserialize, Serialize};

/// Third-party carrier tracking API (Ship24-compatible) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    /// API key presented as a bearer credential.
    pub api_key: String,
    /// Base URL of the tracking API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://api.ship24.com/public/v1".to_string()
}

fn default_timeout() -> u64 {
    15
}
