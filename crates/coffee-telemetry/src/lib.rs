//! # Coffee Telemetry
//!
//! Ambient observability for the Coffee crates.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with an `EnvFilter` and a
//!   plain or JSON `fmt` layer.
//! - **Metrics**: Prometheus counters and histograms for notification
//!   dispatch, queries and container resolution.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coffee_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COFFEE_SERVICE_NAME` | `coffee` | Service name attached to logs |
//! | `COFFEE_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `COFFEE_JSON_LOGS` | `false` | Emit JSON formatted logs |
//! | `COFFEE_CONSOLE_OUTPUT` | `true` | Write logs to stdout at all |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingHandle};
pub use metrics::{
    gather_metrics, register_metrics, MetricsHandle, CONTAINER_RESOLUTIONS, HANDLER_FAILURES,
    NOTIFICATIONS_EMITTED, QUERIES, QUERY_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Hold the returned guard for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = init_logging(config)?;

    Ok(TelemetryGuard {
        _logging: logging,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingHandle,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!("Telemetry guard dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_is_repeatable() {
        let config = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };

        let first = init_telemetry(&config);
        let second = init_telemetry(&config);

        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
