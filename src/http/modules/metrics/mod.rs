//! Prometheus metrics endpoint and HTTP metrics middleware

pub mod handlers;
pub mod middleware;

pub use handlers::*;
pub use middleware::{http_metrics_middleware, HttpMetricsState};
