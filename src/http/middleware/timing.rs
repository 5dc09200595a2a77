//! Timing observer.
//! Counts every request and records its latency, whatever the route.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics::MetricsRegistry;

pub async fn track_request(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();
    let method = request.method().to_string();
    // Unmatched requests fall back to the raw path.
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;

    metrics.record_request(&method, &route, response.status().as_u16(), start_time.elapsed());
    response
}
