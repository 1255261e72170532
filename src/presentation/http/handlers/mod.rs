//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod course;
pub mod health;
