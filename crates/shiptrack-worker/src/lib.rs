//! # shiptrack-worker
//!
//! Periodic background refresh. A cron schedule drives
//! [`TrackingService::refresh_all_active`](shiptrack_service::TrackingService)
//! so shipment statuses stay current even when no user clicks refresh.

pub mod jobs;
pub mod scheduler;

pub use scheduler::RefreshScheduler;
