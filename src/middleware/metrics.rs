//! Request metrics middleware.

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};

use crate::telemetry::metrics::record_request_latency;

/// Labels by route template so account and record ids don't explode cardinality.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    record_request_latency(&method, &path, response.status().as_u16(), start.elapsed());

    response
}
