//! # Modules
//!
//! A module bundles component and command registrations so a feature can be
//! wired into a facade in one call. Loading order is fixed: proxies,
//! mediators, services, then commands.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::command::CommandFactory;
use crate::component::{
    Mediator, MediatorBinding, Proxy, ProxyBinding, Service, ServiceBinding,
};
use crate::facade::Facade;

/// Registrations a [`Module`] applies on load.
pub struct ModuleConfiguration<P, R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    proxies: Vec<ProxyBinding<P, R>>,
    mediators: Vec<MediatorBinding<P, R>>,
    services: Vec<ServiceBinding>,
    commands: Vec<(String, CommandFactory<P, R>)>,
}

impl<P, R> ModuleConfiguration<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            proxies: Vec::new(),
            mediators: Vec::new(),
            services: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_proxy<T: Proxy<P, R>>(mut self, key: &str, proxy: Arc<T>) -> Self {
        self.proxies.push(ProxyBinding::proxy(key, proxy));
        self
    }

    pub fn with_mediator<T: Mediator<P, R>>(mut self, key: &str, mediator: Arc<T>) -> Self {
        self.mediators.push(MediatorBinding::mediator(key, mediator));
        self
    }

    pub fn with_service<T: Service>(mut self, key: &str, service: Arc<T>) -> Self {
        self.services.push(ServiceBinding::service(key, service));
        self
    }

    pub fn with_command(mut self, name: &str, factory: CommandFactory<P, R>) -> Self {
        self.commands.push((name.to_string(), factory));
        self
    }

    pub fn proxies(&self) -> &[ProxyBinding<P, R>] {
        &self.proxies
    }

    pub fn mediators(&self) -> &[MediatorBinding<P, R>] {
        &self.mediators
    }

    pub fn services(&self) -> &[ServiceBinding] {
        &self.services
    }

    /// Command names in declaration order.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Total number of registrations.
    pub fn len(&self) -> usize {
        self.proxies.len() + self.mediators.len() + self.services.len() + self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P, R> Default for ModuleConfiguration<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Named bundle of registrations.
pub struct Module<P, R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    name: String,
    configuration: Option<ModuleConfiguration<P, R>>,
}

impl<P, R> Module<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configuration: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the module's configuration.
    pub fn configure(&mut self, configuration: ModuleConfiguration<P, R>) {
        self.configuration = Some(configuration);
    }

    pub fn configuration(&self) -> Option<&ModuleConfiguration<P, R>> {
        self.configuration.as_ref()
    }

    /// Apply every registration to `facade`. Returns how many were applied;
    /// an unconfigured module applies none.
    #[instrument(name = "module.load", skip_all, fields(module = %self.name, facade = %facade.name()))]
    pub fn load(&self, facade: &Facade<P, R>) -> usize {
        let Some(configuration) = &self.configuration else {
            info!("Module has no configuration, nothing to load");
            return 0;
        };

        for binding in &configuration.proxies {
            facade.register_proxy_binding(binding.clone());
        }
        for binding in &configuration.mediators {
            facade.register_mediator_binding(binding.clone());
        }
        for binding in &configuration.services {
            facade.register_service_binding(binding.clone());
        }
        for (name, factory) in &configuration.commands {
            facade.register_command(name, factory.clone());
        }

        let applied = configuration.len();
        info!(
            proxies = configuration.proxies.len(),
            mediators = configuration.mediators.len(),
            services = configuration.services.len(),
            commands = configuration.commands.len(),
            "Module loaded"
        );
        applied
    }
}
