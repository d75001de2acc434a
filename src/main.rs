//!
//! HTTP metrics service: instruments every request with Prometheus metrics
//! and serves them on `GET /metrics`.
//! Reads configuration from TOML file (~/.config/webmetric/config.toml).

use tracing::{error, info};

use webmetric::config::{default_config_path, AppConfig, LogFormat};
use webmetric::server::{ServerHandle, ServerOptions};
use webmetric::support::shutdown::listen_for_shutdown_signals;

/// Initialize logging with the configured level (overridable via `RUST_LOG`)
/// and output format.
fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    match format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("WEBMETRIC_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging.level, cfg.logging.format);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            init_tracing("info", LogFormat::Text);
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting WebMetric service...");

    let handle = ServerHandle::start(ServerOptions { config }).await?;

    // Listen for OS shutdown signals (SIGTERM, SIGINT)
    let signal = handle.shutdown_signal();
    tokio::spawn(listen_for_shutdown_signals(signal.clone()));

    info!("🚀 Server started. Press Ctrl+C to shutdown gracefully.");
    signal.wait().await;

    handle.shutdown().await;
    info!("👋 WebMetric shutdown complete");
    Ok(())
}
