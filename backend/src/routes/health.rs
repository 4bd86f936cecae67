//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (database and auth configuration)
//! - /health/live - Liveness probe (always returns OK if server is running)

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

const HEALTHY: &str = "healthy";
const UNHEALTHY: &str = "unhealthy";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual readiness checks
#[derive(Serialize)]
pub struct HealthChecks {
    pub database: CheckStatus,
    pub auth: CheckStatus,
}

/// Status of an individual check
#[derive(Serialize)]
pub struct CheckStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn healthy() -> Self {
        Self {
            status: HEALTHY,
            message: None,
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: UNHEALTHY,
            message: Some(message.into()),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == HEALTHY
    }
}

fn static_response(status: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        checks: None,
    })
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    static_response(HEALTHY)
}

/// Readiness probe
///
/// Returns 503 when the database is unreachable or no JWT secret is loaded.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = match db::health_check(state.db()).await {
        Ok(()) => CheckStatus::healthy(),
        Err(_) => CheckStatus::unhealthy("database unavailable"),
    };
    let auth = if state.jwt().is_configured() {
        CheckStatus::healthy()
    } else {
        CheckStatus::unhealthy("JWT secret not configured")
    };

    let ready = database.is_healthy() && auth.is_healthy();
    let response = Json(HealthResponse {
        status: if ready { "ready" } else { "not_ready" },
        version: env!("CARGO_PKG_VERSION"),
        checks: Some(HealthChecks { database, auth }),
    });

    if ready {
        Ok(response)
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, response))
    }
}

/// Liveness probe
pub async fn liveness_check() -> Json<HealthResponse> {
    static_response("alive")
}
