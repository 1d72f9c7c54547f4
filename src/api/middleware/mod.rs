//! API middleware components

pub mod logging;
pub mod metrics;

use axum::{body::Body, extract::MatchedPath, http::Request};

pub use logging::logging_middleware;
pub use metrics::metrics_middleware;

/// Matched route template of a request. Raw paths embed the question text,
/// so unmatched requests share one label.
pub(crate) fn route_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}
