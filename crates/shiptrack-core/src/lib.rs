//! # shiptrack-core
//!
//! Shared foundation for ShipTrack: the unified error type, the
//! `AppResult` alias, and the configuration schemas loaded from TOML
//! plus environment overrides.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
