//! # shiptrack-database
//!
//! PostgreSQL connection pooling, migrations, and repositories.

pub mod connection;
pub mod migration;
pub mod repositories;
