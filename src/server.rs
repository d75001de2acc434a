//! Reusable server runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full service lifecycle:
//! metric registry construction, router setup, TCP bind, and graceful
//! shutdown. Both the binary and the tests use this to start/stop the
//! service without duplicating bootstrap code.

use std::net::SocketAddr;

use tracing::{error, info};

use crate::config::AppConfig;
use crate::http::modules::health::HealthState;
use crate::http::router::create_router;
use crate::registry::{MetricRegistry, SharedMetricRegistry};
use crate::support::errors::ServiceError;
use crate::support::shutdown::ShutdownSignal;

/// Options for starting the service.
#[derive(Default)]
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
}

/// Handle to a running service.
///
/// # Examples
///
/// ```rust,no_run
/// use webmetric::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The shared metric registry backing the middleware and `/metrics`.
    pub registry: SharedMetricRegistry,
    /// Address the server is actually bound to (useful with port 0).
    pub local_addr: SocketAddr,
    /// The configuration the server was started with.
    pub config: AppConfig,

    shutdown: ShutdownSignal,
    task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the service with the given options.
    ///
    /// This will:
    /// 1. Build the metric registry (explicit handle, not a global recorder)
    /// 2. Build the instrumented router (health, docs, `/metrics`)
    /// 3. Bind the TCP listener and serve with graceful shutdown
    pub async fn start(opts: ServerOptions) -> Result<Self, ServiceError> {
        let config = opts.config;

        let registry = MetricRegistry::shared()?;
        info!("📊 Metric registry initialized");

        let router = create_router(registry.clone(), HealthState::new(), &config);

        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("HTTP server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);
        info!("Prometheus scrape endpoint at http://{}/metrics", local_addr);

        let shutdown = ShutdownSignal::new();
        let signal = shutdown.clone();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                signal.wait().await;
                info!("🛑 HTTP server received shutdown signal");
            });
            if let Err(e) = server.await {
                error!("HTTP server error: {}", e);
            }
        });

        Ok(Self {
            registry,
            local_addr,
            config,
            shutdown,
            task,
        })
    }

    /// Clone of the shutdown signal, e.g. to wire up an OS signal listener.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        if let Err(e) = self.task.await {
            error!("HTTP server task panicked: {}", e);
        }
        info!("✅ Server shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;
    use crate::config::{AppConfig, ServerConfig};

    fn loopback_options() -> ServerOptions {
        ServerOptions {
            config: AppConfig {
                server: ServerConfig {
                    host: "127.0.0.1".to_string(),
                    port: 0,
                },
                ..AppConfig::default()
            },
        }
    }

    async fn raw_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    #[tokio::test]
    async fn test_server_serves_metrics_over_tcp() {
        let handle = ServerHandle::start(loopback_options()).await.unwrap();
        assert_ne!(handle.local_addr.port(), 0);

        let response = raw_get(handle.local_addr, "/metrics").await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.contains("http_requests_in_flight"));

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_server_shuts_down_cleanly() {
        let handle = ServerHandle::start(loopback_options()).await.unwrap();
        let addr = handle.local_addr;
        handle.shutdown().await;
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
