//! The shipment refresh job.

use std::sync::Arc;

use tracing::{error, info};

use shiptrack_core::config::worker::WorkerConfig;
use shiptrack_service::TrackingService;

/// Runs one full refresh cycle over all non-terminal shipments.
#[derive(Clone)]
pub struct RefreshJob {
    tracking: Arc<TrackingService>,
    concurrency: usize,
}

impl RefreshJob {
    pub fn new(tracking: Arc<TrackingService>, config: &WorkerConfig) -> Self {
        Self {
            tracking,
            concurrency: config.refresh_concurrency,
        }
    }

    /// Executes the cycle. Errors are logged, never propagated: the next
    /// scheduled run starts fresh either way.
    pub async fn run(&self) {
        match self.tracking.refresh_all_active(self.concurrency).await {
            Ok(changed) => {
                if changed > 0 {
                    info!(changed, "Background refresh detected status changes");
                }
            }
            Err(e) => {
                error!(error = %e, "Background refresh cycle failed");
            }
        }
    }
}
