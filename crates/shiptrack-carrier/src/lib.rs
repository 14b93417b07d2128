//! # shiptrack-carrier
//!
//! Client for the Ship24 tracking API. Wraps the two lookup endpoints the
//! platform uses (register-and-track, search) and normalizes carrier
//! milestone codes into the conventional status strings the rest of the
//! system works with.

pub mod client;
pub mod normalize;
pub mod types;

pub use client::CarrierClient;
pub use types::TrackingInfo;
