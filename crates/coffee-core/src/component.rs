//! # Components
//!
//! Proxies, mediators and services live in three separate registries on the
//! facade. Proxies and mediators get a weak back-reference to the facade
//! when they are registered; services get nothing.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::facade::Facade;

/// Non-owning back-reference handed to proxies and mediators.
pub type FacadeHandle<P, R = ()> = Weak<Facade<P, R>>;

/// Data-side component.
pub trait Proxy<P, R = ()>: Send + Sync + 'static
where
    P: Send + 'static,
    R: Send + 'static,
{
    /// Store the owning facade. Called on every registration.
    fn set_facade(&self, facade: FacadeHandle<P, R>);

    /// The owning facade, if registered and still alive.
    fn facade(&self) -> Option<Arc<Facade<P, R>>>;

    /// Called after the proxy has been inserted into the registry.
    fn on_register(&self) {}

    /// Called after the proxy has been removed or replaced.
    fn on_remove(&self) {}
}

/// View-side component.
pub trait Mediator<P, R = ()>: Send + Sync + 'static
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn set_facade(&self, facade: FacadeHandle<P, R>);

    fn facade(&self) -> Option<Arc<Facade<P, R>>>;

    fn on_register(&self) {}

    fn on_remove(&self) {}
}

/// Service component. Behaviourally opaque to the facade.
pub trait Service: Send + Sync + 'static {}

/// Weak facade back-reference for component implementors.
pub struct FacadeSlot<P, R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    facade: RwLock<Weak<Facade<P, R>>>,
}

impl<P, R> FacadeSlot<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            facade: RwLock::new(Weak::new()),
        }
    }

    pub fn set(&self, facade: FacadeHandle<P, R>) {
        *self.facade.write() = facade;
    }

    pub fn get(&self) -> Option<Arc<Facade<P, R>>> {
        self.facade.read().upgrade()
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl<P, R> Default for FacadeSlot<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Proxy with no behaviour beyond the back-reference.
pub struct BasicProxy<P, R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    slot: FacadeSlot<P, R>,
}

impl<P, R> BasicProxy<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: FacadeSlot::new(),
        }
    }
}

impl<P, R> Default for BasicProxy<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> Proxy<P, R> for BasicProxy<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn set_facade(&self, facade: FacadeHandle<P, R>) {
        self.slot.set(facade);
    }

    fn facade(&self) -> Option<Arc<Facade<P, R>>> {
        self.slot.get()
    }
}

/// Mediator with no behaviour beyond the back-reference.
pub struct BasicMediator<P, R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    slot: FacadeSlot<P, R>,
}

impl<P, R> BasicMediator<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: FacadeSlot::new(),
        }
    }
}

impl<P, R> Default for BasicMediator<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P, R> Mediator<P, R> for BasicMediator<P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn set_facade(&self, facade: FacadeHandle<P, R>) {
        self.slot.set(facade);
    }

    fn facade(&self) -> Option<Arc<Facade<P, R>>> {
        self.slot.get()
    }
}

/// A component paired with its type-erased handle for downcasting.
pub struct ComponentBinding<C: ?Sized> {
    key: String,
    component: Arc<C>,
    any: Arc<dyn Any + Send + Sync>,
}

impl<C: ?Sized> ComponentBinding<C> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn component(&self) -> &Arc<C> {
        &self.component
    }
}

impl<C: ?Sized> Clone for ComponentBinding<C> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            component: Arc::clone(&self.component),
            any: Arc::clone(&self.any),
        }
    }
}

pub type ProxyBinding<P, R = ()> = ComponentBinding<dyn Proxy<P, R>>;
pub type MediatorBinding<P, R = ()> = ComponentBinding<dyn Mediator<P, R>>;
pub type ServiceBinding = ComponentBinding<dyn Service>;

impl<P, R> ComponentBinding<dyn Proxy<P, R>>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn proxy<T: Proxy<P, R>>(key: &str, proxy: Arc<T>) -> Self {
        Self {
            key: key.to_string(),
            component: Arc::clone(&proxy) as Arc<dyn Proxy<P, R>>,
            any: proxy,
        }
    }
}

impl<P, R> ComponentBinding<dyn Mediator<P, R>>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn mediator<T: Mediator<P, R>>(key: &str, mediator: Arc<T>) -> Self {
        Self {
            key: key.to_string(),
            component: Arc::clone(&mediator) as Arc<dyn Mediator<P, R>>,
            any: mediator,
        }
    }
}

impl ComponentBinding<dyn Service> {
    pub fn service<T: Service>(key: &str, service: Arc<T>) -> Self {
        Self {
            key: key.to_string(),
            component: Arc::clone(&service) as Arc<dyn Service>,
            any: service,
        }
    }
}

/// Token → component map for one namespace.
pub(crate) struct ComponentRegistry<C: ?Sized> {
    entries: RwLock<HashMap<String, ComponentBinding<C>>>,
}

impl<C: ?Sized> ComponentRegistry<C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Insert, returning the component previously bound to the key.
    pub(crate) fn insert(&self, binding: ComponentBinding<C>) -> Option<Arc<C>> {
        self.entries
            .write()
            .insert(binding.key.clone(), binding)
            .map(|previous| previous.component)
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<C>> {
        self.entries
            .read()
            .get(key)
            .map(|binding| Arc::clone(&binding.component))
    }

    pub(crate) fn get_as<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let any = self
            .entries
            .read()
            .get(key)
            .map(|binding| Arc::clone(&binding.any))?;
        any.downcast::<T>().ok()
    }

    pub(crate) fn remove(&self, key: &str) -> Option<Arc<C>> {
        self.entries
            .write()
            .remove(key)
            .map(|binding| binding.component)
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// True when both handles point at the same allocation.
pub(crate) fn same_component<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Weather;
    impl Service for Weather {}

    #[test]
    fn test_registry_get_and_downcast() {
        let registry: ComponentRegistry<dyn Service> = ComponentRegistry::new();
        let weather = Arc::new(Weather);
        registry.insert(ServiceBinding::service("weather", Arc::clone(&weather)));

        let erased = registry.get("weather").unwrap();
        let typed = registry.get_as::<Weather>("weather").unwrap();

        assert!(same_component(&erased, &weather));
        assert!(Arc::ptr_eq(&typed, &weather));
        assert!(registry.get_as::<String>("weather").is_none());
    }

    #[test]
    fn test_registry_insert_returns_previous() {
        let registry: ComponentRegistry<dyn Service> = ComponentRegistry::new();
        let first = Arc::new(Weather);
        assert!(registry
            .insert(ServiceBinding::service("w", Arc::clone(&first)))
            .is_none());

        let previous = registry
            .insert(ServiceBinding::service("w", Arc::new(Weather)))
            .unwrap();
        assert!(same_component(&previous, &first));
    }

    #[test]
    fn test_registry_remove() {
        let registry: ComponentRegistry<dyn Service> = ComponentRegistry::new();
        registry.insert(ServiceBinding::service("w", Arc::new(Weather)));

        assert!(registry.remove("w").is_some());
        assert!(registry.remove("w").is_none());
        assert!(!registry.contains("w"));
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn test_slot_without_facade() {
        let slot: FacadeSlot<()> = FacadeSlot::new();
        assert!(!slot.is_set());
        assert!(slot.get().is_none());
    }
}
