//! Health check endpoints for Kubernetes probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;

/// Health response with optional component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Returns 200 whenever the process serves requests
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check; the service is useless without its vector store
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let vector_store = check_vector_store(&state).await;
    let status = vector_store.status;

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(vec![vector_store]),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// Liveness check for Kubernetes probes
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

async fn check_vector_store(state: &AppState) -> HealthCheck {
    let start = Instant::now();

    let (status, message) = match state.rag_service.health_check().await {
        Ok(true) => (HealthStatus::Healthy, None),
        Ok(false) => (
            HealthStatus::Unhealthy,
            Some("Vector store is empty or unreachable".to_string()),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Vector store health check failed");
            (
                HealthStatus::Unhealthy,
                Some("Vector store health check failed".to_string()),
            )
        }
    };

    HealthCheck {
        name: "vector_store".to_string(),
        status,
        message,
        latency_ms: Some(start.elapsed().as_millis() as u64),
    }
}
