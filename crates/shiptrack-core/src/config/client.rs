//! Client channel and polling fallback configuration.

use serde::{Deserialize, Serialize};

/// Settings for the client-side update channel and its polling fallback.
///
/// The reconnect schedule is exponential: `base * 2^attempt`, capped at
/// `max_delay`, for at most `max_reconnect_attempts` attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Initial reconnect delay in milliseconds.
    #[serde(default = "default_base_delay")]
    pub reconnect_base_delay_ms: u64,
    /// Upper bound on the reconnect delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub reconnect_max_delay_ms: u64,
    /// Maximum number of reconnect attempts before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_reconnect_attempts: u32,
    /// Polling fallback interval in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            reconnect_base_delay_ms: default_base_delay(),
            reconnect_max_delay_ms: default_max_delay(),
            max_reconnect_attempts: default_max_attempts(),
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_poll_interval() -> u64 {
    120
}
