//! # Facade
//!
//! Central router. Owns three component registries (proxies, mediators,
//! services), the command bindings, and the notification bus that carries
//! both fire-and-forget notifications and queries.
//!
//! ## Dispatch
//!
//! Subscribers of a name run one after another in subscription order. The
//! caller awaits the whole round. A failing handler stops the round and the
//! error is returned to the caller.
//!
//! ## Queries
//!
//! A query is a notification emitted in collecting mode with a fresh
//! [`CorrelationId`]. Each responder's result is gathered in order and the
//! round is bounded by [`FacadeConfig::query_timeout`].

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use coffee_bus::{
    CorrelationId, HandlerError, Notification, NotificationBus, NotificationHandler,
    SubscriptionId,
};
use coffee_telemetry::{QUERIES, QUERY_DURATION};
use parking_lot::RwLock;
use tracing::{debug, instrument, warn, Span};

use crate::command::{CommandFactory, CommandHandler};
use crate::component::{
    same_component, ComponentRegistry, Mediator, MediatorBinding, Proxy, ProxyBinding, Service,
    ServiceBinding,
};
use crate::config::FacadeConfig;
use crate::error::FacadeError;
use crate::query::QueryResponse;

/// Router between components, commands and listeners.
///
/// Always handled through `Arc<Facade>`: components keep a weak
/// back-reference to it.
pub struct Facade<P, R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    config: FacadeConfig,
    bus: NotificationBus<P, R>,
    commands: RwLock<HashMap<String, SubscriptionId>>,
    proxies: ComponentRegistry<dyn Proxy<P, R>>,
    mediators: ComponentRegistry<dyn Mediator<P, R>>,
    services: ComponentRegistry<dyn Service>,
    this: Weak<Self>,
}

impl<P, R> Facade<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Create a facade after validating `config`.
    pub fn new(config: FacadeConfig) -> Result<Arc<Self>, FacadeError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    pub fn with_defaults() -> Arc<Self> {
        Self::build(FacadeConfig::default())
    }

    fn build(config: FacadeConfig) -> Arc<Self> {
        debug!(facade = %config.name, timeout = ?config.query_timeout, "Facade created");
        Arc::new_cyclic(|this| Self {
            config,
            bus: NotificationBus::new(),
            commands: RwLock::new(HashMap::new()),
            proxies: ComponentRegistry::new(),
            mediators: ComponentRegistry::new(),
            services: ComponentRegistry::new(),
            this: this.clone(),
        })
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Handlers currently subscribed to `name`, commands included.
    pub fn subscriber_count(&self, name: &str) -> usize {
        self.bus.subscriber_count(name)
    }

    pub fn has_subscribers(&self, name: &str) -> bool {
        self.bus.has_subscribers(name)
    }

    /// Notifications and queries emitted through this facade.
    pub fn notifications_emitted(&self) -> u64 {
        self.bus.notifications_emitted()
    }

    /// Drop every command binding and every listener.
    ///
    /// Components stay registered.
    pub fn clear(&self) {
        let mut commands = self.commands.write();
        let dropped = commands.len();
        commands.clear();
        self.bus.clear();
        debug!(facade = %self.config.name, commands = dropped, "Bindings cleared");
    }

    // =========================================================================
    // Proxies
    // =========================================================================

    /// Register (or replace) a proxy under `key` and hand it a back-reference.
    pub fn register_proxy<T: Proxy<P, R>>(&self, key: &str, proxy: Arc<T>) {
        self.register_proxy_binding(ProxyBinding::proxy(key, proxy));
    }

    pub(crate) fn register_proxy_binding(&self, binding: ProxyBinding<P, R>) {
        let key = binding.key().to_string();
        let proxy = Arc::clone(binding.component());
        proxy.set_facade(self.this.clone());

        let replaced = self.proxies.insert(binding);
        match replaced {
            Some(previous) if same_component(&previous, &proxy) => return,
            Some(previous) => previous.on_remove(),
            None => {}
        }
        proxy.on_register();
        debug!(facade = %self.config.name, key = %key, "Proxy registered");
    }

    pub fn get_proxy(&self, key: &str) -> Option<Arc<dyn Proxy<P, R>>> {
        self.proxies.get(key)
    }

    /// Look up a proxy by its concrete type.
    pub fn get_proxy_as<T: Proxy<P, R>>(&self, key: &str) -> Option<Arc<T>> {
        self.proxies.get_as(key)
    }

    pub fn has_proxy(&self, key: &str) -> bool {
        self.proxies.contains(key)
    }

    pub fn remove_proxy(&self, key: &str) -> Option<Arc<dyn Proxy<P, R>>> {
        let removed = self.proxies.remove(key)?;
        removed.on_remove();
        debug!(facade = %self.config.name, key, "Proxy removed");
        Some(removed)
    }

    pub fn proxy_keys(&self) -> Vec<String> {
        self.proxies.keys()
    }

    // =========================================================================
    // Mediators
    // =========================================================================

    /// Register (or replace) a mediator under `key` and hand it a back-reference.
    pub fn register_mediator<T: Mediator<P, R>>(&self, key: &str, mediator: Arc<T>) {
        self.register_mediator_binding(MediatorBinding::mediator(key, mediator));
    }

    pub(crate) fn register_mediator_binding(&self, binding: MediatorBinding<P, R>) {
        let key = binding.key().to_string();
        let mediator = Arc::clone(binding.component());
        mediator.set_facade(self.this.clone());

        let replaced = self.mediators.insert(binding);
        match replaced {
            Some(previous) if same_component(&previous, &mediator) => return,
            Some(previous) => previous.on_remove(),
            None => {}
        }
        mediator.on_register();
        debug!(facade = %self.config.name, key = %key, "Mediator registered");
    }

    pub fn get_mediator(&self, key: &str) -> Option<Arc<dyn Mediator<P, R>>> {
        self.mediators.get(key)
    }

    pub fn get_mediator_as<T: Mediator<P, R>>(&self, key: &str) -> Option<Arc<T>> {
        self.mediators.get_as(key)
    }

    pub fn has_mediator(&self, key: &str) -> bool {
        self.mediators.contains(key)
    }

    pub fn remove_mediator(&self, key: &str) -> Option<Arc<dyn Mediator<P, R>>> {
        let removed = self.mediators.remove(key)?;
        removed.on_remove();
        debug!(facade = %self.config.name, key, "Mediator removed");
        Some(removed)
    }

    pub fn mediator_keys(&self) -> Vec<String> {
        self.mediators.keys()
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Register (or replace) a service. Services get no back-reference.
    pub fn register_service<T: Service>(&self, key: &str, service: Arc<T>) {
        self.register_service_binding(ServiceBinding::service(key, service));
    }

    pub(crate) fn register_service_binding(&self, binding: ServiceBinding) {
        debug!(facade = %self.config.name, key = binding.key(), "Service registered");
        self.services.insert(binding);
    }

    pub fn get_service(&self, key: &str) -> Option<Arc<dyn Service>> {
        self.services.get(key)
    }

    pub fn get_service_as<T: Service>(&self, key: &str) -> Option<Arc<T>> {
        self.services.get_as(key)
    }

    pub fn has_service(&self, key: &str) -> bool {
        self.services.contains(key)
    }

    pub fn remove_service(&self, key: &str) -> Option<Arc<dyn Service>> {
        self.services.remove(key)
    }

    pub fn service_keys(&self) -> Vec<String> {
        self.services.keys()
    }

    // =========================================================================
    // Commands and listeners
    // =========================================================================

    /// Bind `name` to a command factory.
    ///
    /// Every notification or query sent on `name` builds a fresh command and
    /// awaits it. A second registration on the same name replaces the first.
    pub fn register_command(&self, name: &str, factory: CommandFactory<P, R>) {
        let handler = Arc::new(CommandHandler::new(name, factory));
        let mut commands = self.commands.write();

        if let Some(previous) = commands.remove(name) {
            self.bus.unsubscribe(name, previous);
            debug!(facade = %self.config.name, command = name, "Replacing command binding");
        }

        let id = self.bus.subscribe(name, handler);
        commands.insert(name.to_string(), id);
        debug!(facade = %self.config.name, command = name, subscription = %id, "Command registered");
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.read().contains_key(name)
    }

    /// Unbind the command on `name`. Direct listeners stay subscribed.
    pub fn remove_command(&self, name: &str) -> bool {
        let Some(id) = self.commands.write().remove(name) else {
            return false;
        };
        self.bus.unsubscribe(name, id);
        debug!(facade = %self.config.name, command = name, "Command removed");
        true
    }

    pub fn subscribe(
        &self,
        name: &str,
        handler: Arc<dyn NotificationHandler<P, R>>,
    ) -> SubscriptionId {
        self.bus.subscribe(name, handler)
    }

    pub fn subscribe_fn<F>(&self, name: &str, f: F) -> SubscriptionId
    where
        F: Fn(&mut Notification<'_, P>) -> Result<R, HandlerError> + Send + Sync + 'static,
    {
        self.bus.subscribe_fn(name, f)
    }

    pub fn unsubscribe(&self, name: &str, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(name, id)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Run every subscriber of `name` against `body`.
    ///
    /// Handler results are discarded; mutations to `body` are visible to the
    /// caller once this returns. Nobody listening is not an error.
    pub async fn send_notification(&self, name: &str, body: &mut P) -> Result<(), FacadeError> {
        let mut notification = Notification::new(name, body);
        let receivers = self.bus.emit(&mut notification).await?;

        if receivers == 0 {
            debug!(facade = %self.config.name, notification = name, "No subscribers");
        }
        Ok(())
    }

    /// Ask every subscriber of `name` and collect their answers.
    pub async fn query(&self, name: &str, body: P) -> Result<QueryResponse<R>, FacadeError> {
        self.query_with_timeout(name, body, self.config.query_timeout)
            .await
    }

    /// [`query`](Self::query) with an explicit bound for this call.
    #[instrument(
        name = "facade.query",
        skip(self, body),
        fields(facade = %self.config.name, correlation_id = tracing::field::Empty)
    )]
    pub async fn query_with_timeout(
        &self,
        name: &str,
        mut body: P,
        timeout: Duration,
    ) -> Result<QueryResponse<R>, FacadeError> {
        let correlation_id = CorrelationId::new();
        Span::current().record("correlation_id", tracing::field::display(correlation_id));
        let started = Instant::now();

        let mut notification = Notification::correlated(name, &mut body, correlation_id);
        let outcome = tokio::time::timeout(timeout, self.bus.emit_collect(&mut notification)).await;
        QUERY_DURATION.observe(started.elapsed().as_secs_f64());

        match outcome {
            Ok(Ok(results)) => {
                let response = QueryResponse::from_results(results);
                QUERIES.with_label_values(&[response.outcome()]).inc();
                debug!(responders = response.len(), "Query resolved");
                Ok(response)
            }
            Ok(Err(error)) => {
                QUERIES.with_label_values(&["error"]).inc();
                Err(error.into())
            }
            Err(_) => {
                QUERIES.with_label_values(&["timeout"]).inc();
                warn!(?timeout, "Query timed out");
                Err(FacadeError::QueryTimeout {
                    name: name.to_string(),
                    correlation_id,
                    timeout,
                })
            }
        }
    }
}

impl<P, R> fmt::Debug for Facade<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("name", &self.config.name)
            .field("proxies", &self.proxies.keys())
            .field("mediators", &self.mediators.keys())
            .field("services", &self.services.keys())
            .field("commands", &self.commands.read().len())
            .finish()
    }
}
