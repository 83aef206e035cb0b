//! # Injectable
//!
//! Types that know their own container token. Registration is an explicit
//! bootstrap call:
//!
//! ```rust
//! use coffee_ioc::{Container, Injectable, Scope};
//!
//! struct UserService;
//!
//! impl Injectable for UserService {
//!     const TOKEN: &'static str = "UserService";
//!     const SCOPE: Scope = Scope::Singleton;
//!
//!     fn construct() -> Self {
//!         UserService
//!     }
//! }
//!
//! let container = Container::new();
//! container.register_injectable::<UserService>();
//! assert!(container.resolve::<UserService>(UserService::TOKEN).is_some());
//! ```

use crate::container::Scope;

/// A type the container can build on its own.
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Token the type is registered under.
    const TOKEN: &'static str;

    /// Scope used by `Container::register_injectable`.
    const SCOPE: Scope = Scope::Transient;

    /// Build a new instance.
    fn construct() -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Container;
    use std::sync::Arc;

    struct InjectedService;

    impl Injectable for InjectedService {
        const TOKEN: &'static str = "injected:service";

        fn construct() -> Self {
            InjectedService
        }
    }

    #[test]
    fn test_default_scope_is_transient() {
        let container = Container::new();
        container.register_injectable::<InjectedService>();

        let a = container.resolve::<InjectedService>(InjectedService::TOKEN).unwrap();
        let b = container.resolve::<InjectedService>(InjectedService::TOKEN).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_scope_override_per_container() {
        let singleton_container = Container::new();
        let transient_container = Container::new();
        singleton_container.register_injectable_as::<InjectedService>(Scope::Singleton);
        transient_container.register_injectable::<InjectedService>();

        let s1 = singleton_container
            .resolve::<InjectedService>(InjectedService::TOKEN)
            .unwrap();
        let s2 = singleton_container
            .resolve::<InjectedService>(InjectedService::TOKEN)
            .unwrap();
        let t1 = transient_container
            .resolve::<InjectedService>(InjectedService::TOKEN)
            .unwrap();

        assert!(Arc::ptr_eq(&s1, &s2));
        assert!(!Arc::ptr_eq(&s1, &t1));
    }
}
