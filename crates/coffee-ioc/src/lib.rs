//! # Coffee IoC - Dependency Container
//!
//! Resolves named dependencies from registered factories.
//!
//! ## Scopes
//!
//! - [`Scope::Transient`]: the factory runs on every `resolve`.
//! - [`Scope::Singleton`]: the factory runs on the first `resolve` only; the
//!   instance is memoized until the token is re-registered or the container
//!   is reset. Registration never runs the factory.
//!
//! ## Example
//!
//! ```rust
//! use coffee_ioc::{Container, Scope};
//!
//! struct Logger;
//!
//! let container = Container::new();
//! container.register("logger", || Logger, Scope::Singleton);
//!
//! let a = container.resolve::<Logger>("logger").unwrap();
//! let b = container.resolve::<Logger>("logger").unwrap();
//! assert!(std::sync::Arc::ptr_eq(&a, &b));
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod container;
pub mod error;
pub mod injectable;

use std::sync::Arc;

pub use container::{Container, Factory, Instance, Scope};
pub use error::ContainerError;
pub use injectable::Injectable;

/// Resolve `token` from `container`, or from [`Container::root`] when none
/// is given.
pub fn resolve<T>(token: &str, container: Option<&Container>) -> Option<Arc<T>>
where
    T: Send + Sync + 'static,
{
    match container {
        Some(container) => container.resolve(token),
        None => Container::root().resolve(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Settings;

    #[test]
    fn test_resolve_falls_back_to_root() {
        Container::root().register("lib:settings", || Settings, Scope::Transient);
        let local = Container::new();

        assert!(resolve::<Settings>("lib:settings", None).is_some());
        assert!(resolve::<Settings>("lib:settings", Some(&local)).is_none());
    }

    #[test]
    fn test_resolve_prefers_given_container() {
        Container::root().register("lib:shared", || Settings, Scope::Transient);
        let local = Container::new();
        local.register("lib:shared", || Settings, Scope::Singleton);

        let from_root = resolve::<Settings>("lib:shared", None).unwrap();
        let from_local = resolve::<Settings>("lib:shared", Some(&local)).unwrap();

        assert!(!Arc::ptr_eq(&from_root, &from_local));
    }
}
