//! Facade configuration.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Default bound on how long a query waits for its responders.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacadeConfig {
    /// Name attached to facade log lines
    pub name: String,

    /// Upper bound for a whole query round
    pub query_timeout: Duration,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            name: "facade".to_string(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }
}

impl FacadeConfig {
    /// Read `COFFEE_FACADE_NAME` and `COFFEE_QUERY_TIMEOUT_MS`.
    ///
    /// Unparseable values fall back to the defaults with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let query_timeout = match env::var("COFFEE_QUERY_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    warn!(value = %raw, "Invalid COFFEE_QUERY_TIMEOUT_MS, using default");
                    defaults.query_timeout
                }
            },
            Err(_) => defaults.query_timeout,
        };

        Self {
            name: env::var("COFFEE_FACADE_NAME").unwrap_or(defaults.name),
            query_timeout,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query_timeout.is_zero() {
            return Err(ConfigError::ZeroQueryTimeout);
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("query timeout must be greater than zero")]
    ZeroQueryTimeout,

    #[error("facade name must not be empty")]
    EmptyName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FacadeConfig::default();
        assert_eq!(config.query_timeout, Duration::from_millis(30_000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = FacadeConfig::default().with_query_timeout(Duration::ZERO);
        assert_eq!(config.validate(), Err(ConfigError::ZeroQueryTimeout));
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = FacadeConfig::default().with_name("  ");
        assert_eq!(config.validate(), Err(ConfigError::EmptyName));
    }

    /// Run `f` with the given variables set, then restore what was there.
    fn with_env(vars: &[(&str, &str)], f: impl FnOnce()) {
        let saved: Vec<(String, Option<String>)> = vars
            .iter()
            .map(|(key, _)| (key.to_string(), env::var(key).ok()))
            .collect();
        for (key, value) in vars {
            env::set_var(key, value);
        }

        f();

        for (key, previous) in saved {
            match previous {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
    }

    // One test owns these variables so parallel tests never race on them.
    #[test]
    fn test_from_env() {
        with_env(
            &[("COFFEE_QUERY_TIMEOUT_MS", "250"), ("COFFEE_FACADE_NAME", "shop")],
            || {
                let config = FacadeConfig::from_env();
                assert_eq!(config.query_timeout, Duration::from_millis(250));
                assert_eq!(config.name, "shop");
            },
        );

        with_env(&[("COFFEE_QUERY_TIMEOUT_MS", "soon")], || {
            let config = FacadeConfig::from_env();
            assert_eq!(config.query_timeout, DEFAULT_QUERY_TIMEOUT);
            assert!(config.validate().is_ok());
        });

        with_env(&[("COFFEE_QUERY_TIMEOUT_MS", "0")], || {
            let config = FacadeConfig::from_env();
            assert_eq!(config.query_timeout, Duration::ZERO);
            assert!(matches!(
                crate::Facade::<()>::new(config),
                Err(crate::FacadeError::Config(ConfigError::ZeroQueryTimeout))
            ));
        });
    }
}
