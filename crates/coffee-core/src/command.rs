//! # Commands
//!
//! A command is a one-shot unit of work bound to a notification name. The
//! facade never stores command instances: it stores a [`CommandFactory`]
//! and builds a fresh command for every dispatch.

use std::sync::Arc;

use async_trait::async_trait;
use coffee_bus::{HandlerError, Notification, NotificationHandler};
use tracing::trace;

/// One-shot unit of work executed on notification.
///
/// The returned value feeds query result collection; plain notifications
/// discard it.
#[async_trait]
pub trait Command<P, R = ()>: Send
where
    P: Send + 'static,
    R: Send + 'static,
{
    async fn execute(&mut self, notification: &mut Notification<'_, P>) -> Result<R, HandlerError>;
}

type BoxedCommand<P, R> = Box<dyn Command<P, R>>;

/// Builds a fresh [`Command`] per dispatch.
pub struct CommandFactory<P, R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    build: Arc<dyn Fn() -> BoxedCommand<P, R> + Send + Sync>,
}

impl<P, R> CommandFactory<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Wrap a constructor closure.
    pub fn new<C, F>(build: F) -> Self
    where
        C: Command<P, R> + 'static,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self {
            build: Arc::new(move || Box::new(build()) as BoxedCommand<P, R>),
        }
    }

    /// Factory for a command type built with `Default`.
    pub fn of<C>() -> Self
    where
        C: Command<P, R> + Default + 'static,
    {
        Self::new(C::default)
    }

    pub fn create(&self) -> BoxedCommand<P, R> {
        (self.build)()
    }
}

impl<P, R> Clone for CommandFactory<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            build: Arc::clone(&self.build),
        }
    }
}

impl<P, R> std::fmt::Debug for CommandFactory<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandFactory").finish_non_exhaustive()
    }
}

/// Bus handler that runs a freshly built command per notification.
pub(crate) struct CommandHandler<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    name: String,
    factory: CommandFactory<P, R>,
}

impl<P, R> CommandHandler<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub(crate) fn new(name: &str, factory: CommandFactory<P, R>) -> Self {
        Self {
            name: name.to_string(),
            factory,
        }
    }
}

#[async_trait]
impl<P, R> NotificationHandler<P, R> for CommandHandler<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    async fn handle(&self, notification: &mut Notification<'_, P>) -> Result<R, HandlerError> {
        trace!(command = %self.name, "Executing command");
        let mut command = self.factory.create();
        command.execute(notification).await
    }
}
