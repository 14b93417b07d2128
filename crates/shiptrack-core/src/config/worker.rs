//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background refresh worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the background refresh worker runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression for the shipment refresh cycle.
    #[serde(default = "default_refresh_cron")]
    pub refresh_cron: String,
    /// Maximum shipments refreshed concurrently per cycle.
    #[serde(default = "default_concurrency")]
    pub refresh_concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_cron: default_refresh_cron(),
            refresh_concurrency: default_concurrency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_refresh_cron() -> String {
    // Every 2 minutes, matching the client's 120s fallback cadence.
    "0 */2 * * * *".to_string()
}

fn default_concurrency() -> usize {
    8
}
