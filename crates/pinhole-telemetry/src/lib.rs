//! Tracing setup shared by the pinhole binaries.
//!
//! Log output goes to stderr so that command output on stdout stays
//! machine readable. The filter comes from `RUST_LOG` and defaults to `info`.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info";

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Builds the event filter from `directives`, falling back to [`DEFAULT_FILTER`].
pub fn filter_from(directives: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    match directives.map(str::trim) {
        Some(directives) if !directives.is_empty() => {
            EnvFilter::try_new(directives).map_err(|e| TelemetryError::Filter(e.to_string()))
        }
        _ => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Installs the global tracing subscriber.
///
/// Fails if the `RUST_LOG` directives are invalid or a subscriber has
/// already been installed.
pub fn init(format: LogFormat) -> Result<(), TelemetryError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_from(directives.as_deref())?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| TelemetryError::Install(e.to_string()))?;

    tracing::debug!(?format, "tracing initialised");
    Ok(())
}
