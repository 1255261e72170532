//! # Course Catalog Library
//!
//! This crate provides a course catalog service with:
//! - RESTful HTTP API endpoints for courses
//! - A hand-written PostgreSQL persistence layer for the course aggregate
//!   (course, tags, gallery, sections, lessons) with atomic multi-table
//!   writes and LEFT JOIN reconstruction
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Course aggregate entities and the repository trait
//! - **Application Layer**: Course service and DTOs
//! - **Infrastructure Layer**: Connection pool, transactions, course store and decoder
//! - **Presentation Layer**: HTTP handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! course_catalog/
//! +-- config/         Configuration management
//! +-- domain/         Domain entities, value objects, and traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Database and repository implementations
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
