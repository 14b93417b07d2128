//! Logistics assistant chat.

pub mod service;

pub use service::AssistantService;
