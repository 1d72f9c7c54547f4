//! Request/response logging middleware

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::info;

use super::route_label;

/// Log every HTTP request and its outcome.
///
/// No span is created here; `TraceLayer` owns the request span.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = route_label(&request);
    let request_id = extract_request_id(&request);
    let headers_log = loggable_headers(&request);

    info!(
        method = %method,
        route = %route,
        request_id = %request_id,
        headers = %headers_log,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();

    info!(
        method = %method,
        route = %route,
        status = %status.as_u16(),
        duration_ms = %start.elapsed().as_millis(),
        request_id = %request_id,
        "Request completed"
    );

    response
}

fn extract_request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Headers worth logging, with credentials redacted
fn loggable_headers(request: &Request<Body>) -> String {
    request
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            let name = name.as_str().to_lowercase();
            if !should_log_header(&name) {
                return None;
            }

            let value = if is_sensitive_header(&name) {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            Some(format!("{}={}", name, value))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_sensitive_header(name: &str) -> bool {
    matches!(
        name,
        "authorization" | "x-api-key" | "cookie" | "proxy-authorization"
    )
}

fn should_log_header(name: &str) -> bool {
    matches!(
        name,
        "accept"
            | "user-agent"
            | "x-request-id"
            | "x-forwarded-for"
            | "x-real-ip"
            | "authorization"
            | "x-api-key"
    )
}
