//! HTTP metrics middleware for recording request/response metrics

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use super::route_label;
use crate::infrastructure::observability::record_http_request;

/// Record request count and latency per route template
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = route_label(&request);

    let response = next.run(request).await;

    record_http_request(
        method.as_str(),
        &route,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}
