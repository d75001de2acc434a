//! HTTP request metrics middleware
//!
//! Records `http_requests_total` (counter), `http_request_duration_seconds`
//! (histogram) and `http_requests_in_flight` (gauge) for every HTTP request
//! passing through the router. The request and response pass through
//! unchanged; failures surface as their status code label.

use std::time::Instant;

use axum::{
    body::Body, extract::MatchedPath, extract::State, http::Request, middleware::Next,
    response::Response,
};

use crate::http::modules::metrics::handlers::METRICS_PATH;
use crate::registry::SharedMetricRegistry;

/// State for the metrics middleware: the registry handle plus whether the
/// scrape endpoint itself is recorded.
#[derive(Clone)]
pub struct HttpMetricsState {
    pub registry: SharedMetricRegistry,
    pub observe_endpoint: bool,
}

/// Middleware that records HTTP request metrics:
///
/// - **`http_requests_total`** — counter with labels `method`, `path`, `status`
/// - **`http_request_duration_seconds`** — histogram with the same labels
/// - **`http_requests_in_flight`** — gauge, incremented on entry and
///   decremented on exit (including unwinds)
///
/// `path` is the matched route template (e.g. `/users/{id}`), falling back
/// to the raw URI path when no route matched (404s included), so label
/// cardinality stays bounded by the route table.
///
/// Requests to the scrape endpoint pass through unrecorded unless
/// `observe_endpoint` is set.
pub async fn http_metrics_middleware(
    State(state): State<HttpMetricsState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    if !state.observe_endpoint && path == METRICS_PATH {
        return next.run(request).await;
    }

    let inflight = state.registry.inflight_guard();
    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed();
    drop(inflight);

    state
        .registry
        .record_request(&method, &path, response.status(), elapsed);

    response
}
