//! Background job implementations.

pub mod refresh;

pub use refresh::RefreshJob;
