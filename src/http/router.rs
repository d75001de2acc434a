//! API Router with Swagger UI
//!
//! Two entry points:
//!
//! - [`instrument_router`] wraps an arbitrary host router with the HTTP
//!   metrics middleware and mounts the `/metrics` scrape endpoint. This is
//!   explicit composition: the host app stays in charge of its own routes,
//!   and the registry handle is passed in rather than picked up ambiently.
//! - [`create_router`] builds the full service router (health + docs) on
//!   top of it.

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, MetricsConfig};
use crate::http::modules::health::{self, HealthState};
use crate::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, HttpMetricsState, MetricsState, METRICS_PATH,
};
use crate::http::modules::request_id::request_id_middleware;
use crate::registry::SharedMetricRegistry;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(health::health_check),
    components(schemas(health::HealthResponse)),
    tags(
        (name = "Health", description = "Server health check endpoints"),
    ),
    info(
        title = "WebMetric API",
        version = "1.0.0",
        description = "HTTP request metrics service with Prometheus exposition"
    )
)]
pub struct ApiDoc;

/// Wrap a host router with the metrics middleware and mount `GET /metrics`.
///
/// The middleware layer goes on after the merge so every request is
/// instrumented, the 404 fallback included. With `observe_endpoint` off
/// (the default) the middleware passes scrape requests through unrecorded;
/// with it on, `/metrics` is measured like any other route.
pub fn instrument_router(
    app: Router,
    registry: SharedMetricRegistry,
    metrics_cfg: &MetricsConfig,
) -> Router {
    let metrics_routes = Router::new()
        .route(METRICS_PATH, get(prometheus_metrics))
        .with_state(MetricsState {
            registry: registry.clone(),
        });

    app.merge(metrics_routes)
        .layer(middleware::from_fn_with_state(
            HttpMetricsState {
                registry,
                observe_endpoint: metrics_cfg.observe_endpoint,
            },
            http_metrics_middleware,
        ))
}

/// Create the full service router: health + Swagger UI, instrumented.
pub fn create_router(
    registry: SharedMetricRegistry,
    health_state: HealthState,
    config: &AppConfig,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let app = Router::new().merge(swagger_routes).merge(health_routes);

    instrument_router(app, registry, &config.metrics)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
