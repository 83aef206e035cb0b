//! Telemetry configuration from environment variables.

use std::env;

use crate::TelemetryError;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to write logs to stdout
    pub console_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "coffee".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            console_output: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// - `COFFEE_SERVICE_NAME`: Service name (default: coffee)
    /// - `COFFEE_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `COFFEE_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `COFFEE_CONSOLE_OUTPUT`: Enable console output (default: true)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("COFFEE_SERVICE_NAME").unwrap_or_else(|_| "coffee".to_string()),

            log_level: env::var("COFFEE_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("COFFEE_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            console_output: env::var("COFFEE_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }

    /// Reject configurations that cannot produce a log filter.
    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.service_name.trim().is_empty() {
            return Err(TelemetryError::Config("service name is empty".to_string()));
        }
        if self.log_level.trim().is_empty() {
            return Err(TelemetryError::Config("log level is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "coffee");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
        assert!(config.console_output);
    }

    #[test]
    fn test_validate_rejects_empty_level() {
        let config = TelemetryConfig {
            log_level: "  ".to_string(),
            ..TelemetryConfig::default()
        };
        assert!(matches!(config.validate(), Err(TelemetryError::Config(_))));
    }

    #[test]
    fn test_validate_default_ok() {
        assert!(TelemetryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        let keys = [
            "COFFEE_SERVICE_NAME",
            "COFFEE_LOG_LEVEL",
            "COFFEE_JSON_LOGS",
            "COFFEE_CONSOLE_OUTPUT",
        ];
        let saved: Vec<Option<String>> = keys.iter().map(|key| env::var(key).ok()).collect();

        env::set_var("COFFEE_SERVICE_NAME", "shop");
        env::set_var("COFFEE_LOG_LEVEL", "debug");
        env::set_var("COFFEE_JSON_LOGS", "TRUE");
        env::set_var("COFFEE_CONSOLE_OUTPUT", "0");
        let config = TelemetryConfig::from_env();

        for (key, previous) in keys.iter().zip(saved) {
            match previous {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }

        assert_eq!(config.service_name, "shop");
        assert_eq!(config.log_level, "debug");
        assert!(config.json_logs);
        assert!(!config.console_output);
        assert!(config.validate().is_ok());
    }
}
