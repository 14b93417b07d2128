//! # shiptrack-api
//!
//! HTTP API layer. Routes are mounted under `/api`, plus the `/ws` upgrade
//! for the push channel. Handlers stay thin: extract, validate, call a
//! service, shape the response.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
