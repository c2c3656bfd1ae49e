use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::time::Instant;

use crate::{app::AppState, domain::PageRequest};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: chrono::DateTime<chrono::Utc>,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    store: ComponentHealth,
}

/// Health status of a component
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ComponentHealth {
    fn healthy(latency_ms: u64) -> Self {
        Self {
            status: "healthy",
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    fn unhealthy(error: String) -> Self {
        Self {
            status: "unhealthy",
            latency_ms: None,
            error: Some(error),
        }
    }

    fn is_healthy(&self) -> bool {
        self.error.is_none()
    }
}

/// GET /health
///
/// Probes the fleet store with a one-row listing.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store = match check_store(&state).await {
        Ok(latency) => ComponentHealth::healthy(latency),
        Err(e) => ComponentHealth::unhealthy(e.to_string()),
    };
    let healthy = store.is_healthy();
    tracing::debug!(healthy, "health check completed");

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" },
        timestamp: chrono::Utc::now(),
        checks: HealthChecks { store },
    };
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response))
}

async fn check_store(state: &AppState) -> anyhow::Result<u64> {
    let start = Instant::now();
    state.repos.networks.find_page(PageRequest::new(0, 1)).await?;
    Ok(start.elapsed().as_millis() as u64)
}

/// GET /health/live
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
