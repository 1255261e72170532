//! Health Check Handlers
//!
//! # Endpoints
//! - `GET /health` - Static health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe: database reachable and course schema migrated

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::PgPool;
use std::time::Instant;

use crate::startup::AppState;

static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Pin the start time used for uptime reporting
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness report
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: CheckResult,
    pub course_schema: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// Queries slower than this mark a check as degraded
const DEGRADED_AFTER_MS: u64 = 100;

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Returns 503 when any check is unhealthy
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let database = probe(&state.db, "SELECT 1").await;
    let course_schema = if database.status == HealthStatus::Unhealthy {
        CheckResult {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some("skipped: database unavailable".into()),
        }
    } else {
        probe(&state.db, "SELECT 1 FROM courses LIMIT 1").await
    };

    let status = database.status.max(course_schema.status);
    let response = ReadinessResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: SERVER_START.elapsed().as_secs(),
        started_at: SERVER_START_TIME.to_rfc3339(),
        checks: ReadinessChecks {
            database,
            course_schema,
        },
    };

    let status_code = match status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status_code, Json(response))
}

async fn probe(pool: &PgPool, query: &str) -> CheckResult {
    let start = Instant::now();
    match sqlx::query(query).execute(pool).await {
        Ok(_) => {
            let latency = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            CheckResult {
                status: status_for_latency(latency),
                latency_ms: Some(latency),
                message: None,
            }
        }
        Err(e) => {
            tracing::warn!(query, error = %e, "Readiness check failed");
            CheckResult {
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                message: Some(e.to_string()),
            }
        }
    }
}

fn status_for_latency(latency_ms: u64) -> HealthStatus {
    if latency_ms < DEGRADED_AFTER_MS {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    }
}
