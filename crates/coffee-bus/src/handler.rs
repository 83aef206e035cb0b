//! # Notification Handlers
//!
//! Defines the subscribing side of the bus.

use async_trait::async_trait;
use std::error::Error as StdError;
use thiserror::Error;

use crate::notification::Notification;

/// Failure raised by a handler or command while processing a notification.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error with context.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        Self {
            message: error.to_string(),
            source: Some(error.into()),
        }
    }
}

/// A subscriber on a bus channel.
///
/// Handlers run one at a time in subscription order; the emitter waits for
/// the returned future before moving on to the next handler.
#[async_trait]
pub trait NotificationHandler<P, R>: Send + Sync
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Process a notification and produce this handler's result.
    async fn handle(&self, notification: &mut Notification<'_, P>) -> Result<R, HandlerError>;
}

/// Adapter turning a synchronous closure into a [`NotificationHandler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<P, R, F> NotificationHandler<P, R> for FnHandler<F>
where
    P: Send + 'static,
    R: Send + 'static,
    F: Fn(&mut Notification<'_, P>) -> Result<R, HandlerError> + Send + Sync,
{
    async fn handle(&self, notification: &mut Notification<'_, P>) -> Result<R, HandlerError> {
        (self.0)(notification)
    }
}
