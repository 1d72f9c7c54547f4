//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

const PIPELINE_DURATION: &str = "rag_pipeline_duration_seconds";

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full(PIPELINE_DURATION.to_string()),
        &config.pipeline_buckets,
    );
    let builder = match builder {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring invalid pipeline histogram buckets");
            PrometheusBuilder::new()
        }
    };

    match builder.install_recorder() {
        Ok(handle) => {
            gauge!("rag_api_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric. `route` is the matched route template,
/// never the raw path, which carries the query text.
pub fn record_http_request(method: &str, route: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", route.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record an LLM request metric
pub fn record_llm_request(params: LlmRequestMetricParams) {
    let labels = [
        ("provider", params.provider.to_string()),
        ("model", params.model.to_string()),
        ("status", if params.success { "success" } else { "error" }.to_string()),
    ];

    counter!("llm_requests_total", &labels).increment(1);
    histogram!("llm_request_duration_seconds", &labels).record(params.duration.as_secs_f64());

    if let Some(tokens) = params.input_tokens {
        counter!("llm_input_tokens_total", &labels).increment(tokens);
    }

    if let Some(tokens) = params.output_tokens {
        counter!("llm_output_tokens_total", &labels).increment(tokens);
    }
}

/// Parameters for LLM request metrics
pub struct LlmRequestMetricParams<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    pub success: bool,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Record one pipeline run. `outcome` is `ok`, `out_of_domain` or an error kind.
pub fn record_pipeline_run(pipeline: &'static str, outcome: &str, duration: Duration) {
    let labels = [("pipeline", pipeline.to_string()), ("outcome", outcome.to_string())];

    counter!("rag_pipeline_runs_total", &labels).increment(1);
    histogram!(PIPELINE_DURATION, "pipeline" => pipeline)
        .record(duration.as_secs_f64());
}

/// Record the branch a CRAG run took
pub fn record_crag_action(action: &'static str) {
    counter!("crag_actions_total", "action" => action).increment(1);
}
