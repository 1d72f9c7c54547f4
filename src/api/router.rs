use axum::{middleware, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::search;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state.
///
/// The metrics endpoint is mounted when a Prometheus handle is given.
pub fn create_router(state: AppState, metrics: Option<(PrometheusMetrics, String)>) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/search", search::create_search_router())
        .with_state(state);

    if let Some((metrics, path)) = metrics {
        router = router.merge(create_metrics_router(metrics, &path));
    }

    router
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "running"
}
