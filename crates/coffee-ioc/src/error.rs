//! # Error Types

use thiserror::Error;

/// Errors from strict container resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// No factory is registered under the token.
    #[error("No registration for token '{token}'")]
    NotRegistered { token: String },

    /// The factory produced a value of a different type than requested.
    #[error("Token '{token}' does not resolve to {expected}")]
    TypeMismatch {
        token: String,
        expected: &'static str,
    },
}
