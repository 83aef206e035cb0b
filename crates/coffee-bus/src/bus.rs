//! # Notification Bus
//!
//! Channel registry plus the two emit modes: fire-and-forget (`emit`) and
//! ordered result collection (`emit_collect`).

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use coffee_telemetry::{HANDLER_FAILURES, NOTIFICATIONS_EMITTED};
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::handler::{FnHandler, HandlerError, NotificationHandler};
use crate::notification::Notification;

/// Identifier returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors from emit operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// A handler failed; handlers after it on the channel did not run.
    #[error("Handler {subscription} on channel '{channel}' failed: {source}")]
    HandlerFailed {
        channel: String,
        subscription: SubscriptionId,
        #[source]
        source: HandlerError,
    },
}

struct Subscriber<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    id: SubscriptionId,
    handler: Arc<dyn NotificationHandler<P, R>>,
}

impl<P, R> Clone for Subscriber<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Arc::clone(&self.handler),
        }
    }
}

/// In-process notification bus.
///
/// `P` is the body type carried on every channel (usually an application
/// enum) and `R` the result type handlers produce.
pub struct NotificationBus<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Subscribers per channel, in subscription order.
    channels: RwLock<HashMap<String, Vec<Subscriber<P, R>>>>,

    /// Source of subscription IDs.
    next_id: AtomicU64,

    /// Total emits, including emits with no subscribers.
    notifications_emitted: AtomicU64,
}

impl<P, R> NotificationBus<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            notifications_emitted: AtomicU64::new(0),
        }
    }

    /// Subscribe a handler to `channel`. It runs after every handler already
    /// subscribed there.
    pub fn subscribe(
        &self,
        channel: &str,
        handler: Arc<dyn NotificationHandler<P, R>>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.channels
            .write()
            .entry(channel.to_string())
            .or_default()
            .push(Subscriber { id, handler });

        debug!(channel = channel, subscription = %id, "Handler subscribed");
        id
    }

    /// Subscribe a synchronous closure.
    pub fn subscribe_fn<F>(&self, channel: &str, f: F) -> SubscriptionId
    where
        F: Fn(&mut Notification<'_, P>) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        self.subscribe(channel, Arc::new(FnHandler::new(f)))
    }

    /// Remove a subscription. Returns false if it was not found.
    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        let mut channels = self.channels.write();
        let Some(subscribers) = channels.get_mut(channel) else {
            return false;
        };

        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        let removed = subscribers.len() != before;

        if subscribers.is_empty() {
            channels.remove(channel);
        }
        if removed {
            debug!(channel = channel, subscription = %id, "Handler unsubscribed");
        }
        removed
    }

    /// Emit without surfacing results.
    ///
    /// Returns the number of handlers that ran.
    pub async fn emit(&self, notification: &mut Notification<'_, P>) -> Result<usize, BusError> {
        self.emit_collect(notification).await.map(|results| results.len())
    }

    /// Emit and collect every handler's result in subscription order.
    ///
    /// An empty vector means nobody is subscribed to the channel.
    pub async fn emit_collect(
        &self,
        notification: &mut Notification<'_, P>,
    ) -> Result<Vec<R>, BusError> {
        let channel = notification.name();
        let subscribers = self.snapshot(channel);

        self.notifications_emitted.fetch_add(1, Ordering::Relaxed);
        NOTIFICATIONS_EMITTED.inc();

        if subscribers.is_empty() {
            debug!(channel = channel, "Notification emitted with no subscribers");
            return Ok(Vec::new());
        }

        let mut results = Vec::with_capacity(subscribers.len());
        for subscriber in subscribers {
            match subscriber.handler.handle(notification).await {
                Ok(result) => results.push(result),
                Err(source) => {
                    HANDLER_FAILURES.inc();
                    warn!(
                        channel = channel,
                        subscription = %subscriber.id,
                        error = %source,
                        "Handler failed, aborting dispatch"
                    );
                    return Err(BusError::HandlerFailed {
                        channel: channel.to_string(),
                        subscription: subscriber.id,
                        source,
                    });
                }
            }
        }

        debug!(
            channel = channel,
            receivers = results.len(),
            "Notification emitted"
        );
        Ok(results)
    }

    /// Number of handlers subscribed to `channel`.
    #[must_use]
    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.channels.read().get(channel).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn has_subscribers(&self, channel: &str) -> bool {
        self.subscriber_count(channel) > 0
    }

    /// Names of every channel with at least one subscriber.
    #[must_use]
    pub fn channels(&self) -> Vec<String> {
        self.channels.read().keys().cloned().collect()
    }

    /// Total emits performed on this bus.
    #[must_use]
    pub fn notifications_emitted(&self) -> u64 {
        self.notifications_emitted.load(Ordering::Relaxed)
    }

    /// Drop every subscription on every channel.
    pub fn clear(&self) {
        self.channels.write().clear();
    }

    fn snapshot(&self, channel: &str) -> Vec<Subscriber<P, R>> {
        self.channels
            .read()
            .get(channel)
            .cloned()
            .unwrap_or_default()
    }
}

impl<P, R> Default for NotificationBus<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
