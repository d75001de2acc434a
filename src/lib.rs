//! # WebMetric
//!
//! Minimal HTTP service that instruments every request with Prometheus
//! metrics and exposes them on `GET /metrics`.
//!
//! ## Architecture
//!
//! - **registry**: the shared metric registry handle (counter, histogram,
//!   in-flight gauge), explicitly injected instead of an ambient global
//! - **http**: axum router, metrics middleware, exposition endpoint, health
//! - **server**: reusable server runtime (`ServerHandle`) for the binary
//!   and tests
//! - **config**: TOML application configuration
//! - **support**: shutdown signaling and error types

pub mod config;
pub mod http;
pub mod registry;
pub mod server;
pub mod support;

pub use config::{default_config_path, AppConfig, MetricsConfig};
pub use http::router::{create_router, instrument_router};
pub use registry::{MetricRegistry, SharedMetricRegistry};
pub use server::{ServerHandle, ServerOptions};
pub use support::errors::ServiceError;
pub use support::shutdown::ShutdownSignal;
