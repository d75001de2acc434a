//! Service error types

use thiserror::Error;

/// Errors that can occur while starting or running the service.
///
/// Config-file problems are not represented here: loading falls back to
/// defaults with a logged error in `main` and never reaches the server
/// runtime.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Metrics recorder error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
