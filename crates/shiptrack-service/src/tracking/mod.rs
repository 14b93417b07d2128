//! On-demand refresh and change detection.

pub mod detect;
pub mod service;

pub use detect::Detection;
pub use service::{TrackOutcome, TrackingService};
