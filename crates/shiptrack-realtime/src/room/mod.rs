//! Per-user rooms.

pub mod registry;

pub use registry::RoomRegistry;
