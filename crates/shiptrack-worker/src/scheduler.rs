//! Cron scheduler for the periodic refresh.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use shiptrack_core::config::worker::WorkerConfig;
use shiptrack_core::error::AppError;
use shiptrack_core::result::AppResult;

use crate::jobs::refresh::RefreshJob;

/// Cron-based scheduler for the background refresh cycle.
pub struct RefreshScheduler {
    scheduler: JobScheduler,
    cron: String,
    job: Arc<RefreshJob>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("cron", &self.cron)
            .finish()
    }
}

impl RefreshScheduler {
    pub async fn new(config: &WorkerConfig, job: RefreshJob) -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            cron: config.refresh_cron.clone(),
            job: Arc::new(job),
        })
    }

    /// Registers the refresh schedule and starts the scheduler.
    pub async fn start(&self) -> AppResult<()> {
        let job = Arc::clone(&self.job);
        let cron_job = CronJob::new_async(self.cron.as_str(), move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                tracing::debug!("Running scheduled shipment refresh");
                job.run().await;
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create refresh schedule: {e}")))?;

        self.scheduler
            .add(cron_job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add refresh schedule: {e}")))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!(cron = %self.cron, "Refresh scheduler started");
        Ok(())
    }

    /// Shuts the scheduler down.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Refresh scheduler shut down");
        Ok(())
    }
}
