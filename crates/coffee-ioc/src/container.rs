//! # Container
//!
//! Token → factory registry with lazy singleton memoization.
//!
//! ## Locking
//!
//! - The registration map sits behind a `RwLock` that is released before
//!   any factory runs, so factories may resolve other tokens.
//! - Each singleton slot has its own `Mutex`, held while the factory runs,
//!   so concurrent first resolutions construct exactly one instance.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use coffee_telemetry::CONTAINER_RESOLUTIONS;
use lazy_static::lazy_static;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::ContainerError;
use crate::injectable::Injectable;

/// A resolved, type-erased instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

lazy_static! {
    static ref ROOT: Container = Container::new();
}

/// Resolution policy of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// A fresh instance on every resolution.
    #[default]
    Transient,
    /// One instance, built on first resolution.
    Singleton,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Singleton => "singleton",
        }
    }
}

/// Zero-argument constructor stored under a token.
#[derive(Clone)]
pub struct Factory(Arc<dyn Fn() -> Instance + Send + Sync>);

impl Factory {
    /// Wrap a closure producing a `T`.
    pub fn new<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self(Arc::new(move || Arc::new(f()) as Instance))
    }

    /// A factory that hands out clones of one existing `Arc`.
    pub fn shared<T>(value: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self(Arc::new(move || Arc::clone(&value) as Instance))
    }

    /// Run the factory.
    pub fn create(&self) -> Instance {
        (self.0)()
    }

    /// Run the factory and downcast the result.
    pub fn create_as<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.create().downcast::<T>().ok()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory(..)")
    }
}

struct Registration {
    factory: Factory,
    scope: Scope,
    /// Populated on first resolution of a singleton; unused for transients.
    slot: Arc<Mutex<Option<Instance>>>,
}

impl Registration {
    fn new(factory: Factory, scope: Scope) -> Self {
        Self {
            factory,
            scope,
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

/// Dependency container.
///
/// Construct one per application (or per test) and pass it where it is
/// needed; [`Container::root`] exists for code that cannot be handed one.
pub struct Container {
    registrations: RwLock<HashMap<String, Registration>>,
}

impl Container {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: RwLock::new(HashMap::new()),
        }
    }

    /// Process-wide default container.
    ///
    /// Lives for the whole process and is never torn down. Prefer an
    /// explicitly constructed container wherever one can be passed in.
    pub fn root() -> &'static Container {
        &ROOT
    }

    /// Bind `token` to `factory`, replacing any previous binding and any
    /// singleton instance built from it.
    pub fn register<T, F>(&self, token: &str, factory: F, scope: Scope)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_factory(token, Factory::new(factory), scope);
    }

    /// Bind `token` to an already erased [`Factory`].
    pub fn register_factory(&self, token: &str, factory: Factory, scope: Scope) {
        let previous = self
            .registrations
            .write()
            .insert(token.to_string(), Registration::new(factory, scope));

        if previous.is_some() {
            debug!(token = token, scope = scope.as_str(), "Registration replaced");
        } else {
            debug!(token = token, scope = scope.as_str(), "Registration added");
        }
    }

    /// Bind `token` to one existing instance; every resolution returns it.
    pub fn register_shared<T>(&self, token: &str, value: Arc<T>)
    where
        T: Send + Sync + 'static,
    {
        self.register_factory(token, Factory::shared(value), Scope::Singleton);
    }

    /// Register an [`Injectable`] type under its own token and scope.
    pub fn register_injectable<T: Injectable>(&self) {
        self.register(T::TOKEN, T::construct, T::SCOPE);
    }

    /// Register an [`Injectable`] type with an explicit scope.
    pub fn register_injectable_as<T: Injectable>(&self, scope: Scope) {
        self.register(T::TOKEN, T::construct, scope);
    }

    /// Resolve `token` as a `T`.
    ///
    /// Returns `None` for unknown tokens. A type mismatch is logged and
    /// also yields `None`; use [`Container::try_resolve`] to tell them apart.
    pub fn resolve<T>(&self, token: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        match self.try_resolve(token) {
            Ok(instance) => Some(instance),
            Err(ContainerError::NotRegistered { .. }) => None,
            Err(e) => {
                warn!(token = token, error = %e, "Resolution type mismatch");
                None
            }
        }
    }

    /// Resolve `token` as a `T`, reporting why resolution failed.
    pub fn try_resolve<T>(&self, token: &str) -> Result<Arc<T>, ContainerError>
    where
        T: Send + Sync + 'static,
    {
        let instance =
            self.resolve_instance(token)
                .ok_or_else(|| ContainerError::NotRegistered {
                    token: token.to_string(),
                })?;

        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                token: token.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Resolve `token` without downcasting.
    pub fn resolve_instance(&self, token: &str) -> Option<Instance> {
        let (factory, scope, slot) = {
            let registrations = self.registrations.read();
            let registration = registrations.get(token)?;
            (
                registration.factory.clone(),
                registration.scope,
                Arc::clone(&registration.slot),
            )
        };

        CONTAINER_RESOLUTIONS
            .with_label_values(&[scope.as_str()])
            .inc();

        match scope {
            Scope::Transient => Some(factory.create()),
            Scope::Singleton => {
                let mut slot = slot.lock();
                let instance = slot.get_or_insert_with(|| {
                    debug!(token = token, "Constructing singleton");
                    factory.create()
                });
                Some(Arc::clone(instance))
            }
        }
    }

    /// The raw factory for `token`, bypassing the singleton policy.
    pub fn get(&self, token: &str) -> Option<Factory> {
        self.registrations
            .read()
            .get(token)
            .map(|registration| registration.factory.clone())
    }

    /// Scope of the registration under `token`.
    pub fn scope(&self, token: &str) -> Option<Scope> {
        self.registrations.read().get(token).map(|r| r.scope)
    }

    /// True once a singleton token has been resolved at least once.
    pub fn is_instantiated(&self, token: &str) -> bool {
        // The slot may be held by a factory that itself takes the map lock.
        let slot = self
            .registrations
            .read()
            .get(token)
            .map(|r| Arc::clone(&r.slot));
        slot.is_some_and(|slot| slot.lock().is_some())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.registrations.read().contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// Registered tokens, sorted.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.registrations.read().keys().cloned().collect();
        tokens.sort();
        tokens
    }

    /// Remove every registration and every singleton instance.
    pub fn reset(&self) {
        let mut registrations = self.registrations.write();
        let dropped = registrations.len();
        registrations.clear();
        debug!(dropped = dropped, "Container reset");
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("tokens", &self.tokens())
            .finish()
    }
}
