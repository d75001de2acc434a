//! Prometheus metrics handler
//!
//! Exposes `GET /metrics` returning Prometheus text format. The handler
//! reads from the shared [`MetricRegistry`](crate::registry::MetricRegistry)
//! injected at router construction.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::registry::SharedMetricRegistry;

/// Fixed, well-known path of the scrape endpoint.
pub const METRICS_PATH: &str = "/metrics";

/// Content type of the Prometheus text exposition format.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub registry: SharedMetricRegistry,
}

/// `GET /metrics` — Prometheus scrape endpoint (no auth)
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let body = state.registry.render();
    (
        StatusCode::OK,
        [("content-type", EXPOSITION_CONTENT_TYPE)],
        body,
    )
}
