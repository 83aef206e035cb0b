//! Facade error types.

use std::time::Duration;

use coffee_bus::{BusError, CorrelationId};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum FacadeError {
    /// A handler or command failed while the notification was dispatched.
    #[error(transparent)]
    Dispatch(#[from] BusError),

    /// Responders did not finish within the query bound.
    #[error("query '{name}' ({correlation_id}) timed out after {timeout:?}")]
    QueryTimeout {
        name: String,
        correlation_id: CorrelationId,
        timeout: Duration,
    },

    #[error("invalid facade configuration: {0}")]
    Config(#[from] ConfigError),
}
