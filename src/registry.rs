//! Shared metric registry
//!
//! Owns the Prometheus recorder for the process. The recorder is NOT
//! installed as the global `metrics` recorder: the registry is an explicit
//! handle, shared via `Arc` and injected into the middleware and the
//! exposition endpoint at construction time. All recording goes through
//! [`metrics::with_local_recorder`], so two registries in one process (e.g.
//! parallel tests) never interfere.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusRecorder};

/// Counter: total HTTP requests, labeled `method`, `path`, `status`.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Histogram: request latency in seconds, labeled `method`, `path`, `status`.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Gauge: requests currently in flight (no labels).
pub const HTTP_REQUESTS_IN_FLIGHT: &str = "http_requests_in_flight";

/// Latency histogram buckets, in seconds.
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Shared handle to the process-wide metric registry.
pub type SharedMetricRegistry = Arc<MetricRegistry>;

/// Process-wide metric state: one recorder, one exposition handle.
///
/// Created once at startup and shared by every request-handling task.
/// Individual accumulators are atomics inside the recorder, so concurrent
/// updates and concurrent scrapes need no further locking here.
pub struct MetricRegistry {
    recorder: PrometheusRecorder,
}

impl MetricRegistry {
    /// Build the registry with explicit latency buckets and pre-registered
    /// metric descriptions.
    ///
    /// The in-flight gauge is zeroed on construction so a scrape before any
    /// traffic still returns a well-formed, zero-valued sample.
    pub fn new() -> Result<Self, BuildError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                DURATION_BUCKETS,
            )?
            .build_recorder();

        metrics::with_local_recorder(&recorder, || {
            metrics::describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP requests processed");
            metrics::describe_histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                metrics::Unit::Seconds,
                "HTTP request latency"
            );
            metrics::describe_gauge!(
                HTTP_REQUESTS_IN_FLIGHT,
                "HTTP requests currently being processed"
            );
            metrics::gauge!(HTTP_REQUESTS_IN_FLIGHT).set(0.0);
        });

        Ok(Self { recorder })
    }

    /// Shared-handle constructor, the form the middleware and router take.
    pub fn shared() -> Result<SharedMetricRegistry, BuildError> {
        Ok(Arc::new(Self::new()?))
    }

    /// Record one completed request: bump the request counter and observe
    /// the latency histogram for the `(method, path, status)` label set.
    pub fn record_request(
        &self,
        method: &Method,
        path: &str,
        status: StatusCode,
        elapsed: Duration,
    ) {
        let method = method.to_string();
        let path = path.to_string();
        let status = status.as_u16().to_string();
        let seconds = elapsed.as_secs_f64();

        metrics::with_local_recorder(&self.recorder, || {
            metrics::counter!(
                HTTP_REQUESTS_TOTAL,
                "method" => method.clone(),
                "path" => path.clone(),
                "status" => status.clone()
            )
            .increment(1);
            metrics::histogram!(
                HTTP_REQUEST_DURATION_SECONDS,
                "method" => method,
                "path" => path,
                "status" => status
            )
            .record(seconds);
        });
    }

    /// Increment the in-flight gauge, returning a guard that decrements it
    /// when dropped. Drop runs during unwinding too, so the gauge returns
    /// to zero even if the wrapped handler panics.
    pub fn inflight_guard(self: &Arc<Self>) -> InflightGuard {
        metrics::with_local_recorder(&self.recorder, || {
            metrics::gauge!(HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
        });
        InflightGuard {
            registry: Arc::clone(self),
        }
    }

    /// Render a point-in-time snapshot in Prometheus text exposition format.
    ///
    /// Infallible with this recorder: rendering only reads atomics and
    /// formats strings.
    pub fn render(&self) -> String {
        self.recorder.handle().render()
    }
}

/// RAII guard for the in-flight gauge.
pub struct InflightGuard {
    registry: SharedMetricRegistry,
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        metrics::with_local_recorder(&self.registry.recorder, || {
            metrics::gauge!(HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Find a sample value in exposition text by metric name and label
    /// subset, ignoring label order.
    fn sample_value(body: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        for line in body.lines() {
            if line.starts_with('#') {
                continue;
            }
            let Some((ident, value)) = line.rsplit_once(' ') else {
                continue;
            };
            let (sample_name, label_str) = match ident.split_once('{') {
                Some((n, rest)) => (n, rest.trim_end_matches('}')),
                None => (ident, ""),
            };
            if sample_name != name {
                continue;
            }
            let matches_all = labels
                .iter()
                .all(|(k, v)| label_str.contains(&format!("{k}=\"{v}\"")));
            if matches_all {
                return value.parse().ok();
            }
        }
        None
    }

    #[test]
    fn test_fresh_registry_renders_zero_gauge() {
        let registry = MetricRegistry::shared().unwrap();
        let body = registry.render();
        assert_eq!(
            sample_value(&body, HTTP_REQUESTS_IN_FLIGHT, &[]),
            Some(0.0)
        );
    }

    #[test]
    fn test_record_request_counts_and_observes() {
        let registry = MetricRegistry::shared().unwrap();
        registry.record_request(
            &Method::GET,
            "/ok",
            StatusCode::OK,
            Duration::from_millis(3),
        );
        registry.record_request(
            &Method::GET,
            "/ok",
            StatusCode::OK,
            Duration::from_millis(7),
        );

        let body = registry.render();
        let labels = [("method", "GET"), ("path", "/ok"), ("status", "200")];
        assert_eq!(sample_value(&body, HTTP_REQUESTS_TOTAL, &labels), Some(2.0));
        assert_eq!(
            sample_value(&body, "http_request_duration_seconds_count", &labels),
            Some(2.0)
        );
        let sum = sample_value(&body, "http_request_duration_seconds_sum", &labels).unwrap();
        assert!((sum - 0.010).abs() < 0.001, "sum was {sum}");
    }

    #[test]
    fn test_distinct_label_sets_get_distinct_accumulators() {
        let registry = MetricRegistry::shared().unwrap();
        registry.record_request(
            &Method::GET,
            "/a",
            StatusCode::OK,
            Duration::from_millis(1),
        );
        registry.record_request(
            &Method::POST,
            "/a",
            StatusCode::CREATED,
            Duration::from_millis(1),
        );

        let body = registry.render();
        assert_eq!(
            sample_value(
                &body,
                HTTP_REQUESTS_TOTAL,
                &[("method", "GET"), ("status", "200")]
            ),
            Some(1.0)
        );
        assert_eq!(
            sample_value(
                &body,
                HTTP_REQUESTS_TOTAL,
                &[("method", "POST"), ("status", "201")]
            ),
            Some(1.0)
        );
    }

    #[test]
    fn test_inflight_guard_decrements_on_drop() {
        let registry = MetricRegistry::shared().unwrap();
        let guard = registry.inflight_guard();
        assert_eq!(
            sample_value(&registry.render(), HTTP_REQUESTS_IN_FLIGHT, &[]),
            Some(1.0)
        );
        drop(guard);
        assert_eq!(
            sample_value(&registry.render(), HTTP_REQUESTS_IN_FLIGHT, &[]),
            Some(0.0)
        );
    }

    #[test]
    fn test_inflight_guard_decrements_on_panic() {
        let registry = MetricRegistry::shared().unwrap();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = registry.inflight_guard();
            panic!("handler blew up");
        }));
        assert!(result.is_err());
        assert_eq!(
            sample_value(&registry.render(), HTTP_REQUESTS_IN_FLIGHT, &[]),
            Some(0.0)
        );
    }

    #[test]
    fn test_registries_are_isolated() {
        let a = MetricRegistry::shared().unwrap();
        let b = MetricRegistry::shared().unwrap();
        a.record_request(
            &Method::GET,
            "/only-a",
            StatusCode::OK,
            Duration::from_millis(1),
        );
        assert!(b.render().lines().all(|l| !l.contains("/only-a")));
    }

    #[test]
    fn test_render_is_idempotent_without_traffic() {
        let registry = MetricRegistry::shared().unwrap();
        registry.record_request(
            &Method::GET,
            "/x",
            StatusCode::OK,
            Duration::from_millis(1),
        );
        assert_eq!(registry.render(), registry.render());
    }
}
