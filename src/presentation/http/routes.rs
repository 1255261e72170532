//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{routing::get, Router};

use super::handlers;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}

/// API v1 routes
fn api_routes() -> Router<AppState> {
    Router::new().nest("/courses", course_routes())
}

/// Course routes
fn course_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::course::list_courses).post(handlers::course::create_course),
        )
        .route(
            "/{course_id}",
            get(handlers::course::get_course)
                .put(handlers::course::update_course)
                .delete(handlers::course::delete_course),
        )
}
