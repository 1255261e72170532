//! Infrastructure Layer
//!
//! PostgreSQL implementations of the course persistence contract:
//! - Connection pool and scoped transactions
//! - Course repository (aggregate writer and graph/list reconstructors)

pub mod database;
pub mod repositories;
