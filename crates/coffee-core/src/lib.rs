//! # Coffee Core
//!
//! The [`Facade`]: a central router that decouples the parts of an
//! application. Components register under string keys, commands bind to
//! notification names, and everything talks through named notifications
//! and queries instead of holding references to each other.
//!
//! ## Pieces
//!
//! - **Proxies / mediators / services**: three independent registries.
//!   Proxies and mediators receive a weak back-reference to the facade.
//! - **Commands**: a factory per notification name; a fresh command runs on
//!   every dispatch.
//! - **Notifications**: `send_notification` runs every subscriber in order
//!   and hands the (possibly mutated) body back to the caller.
//! - **Queries**: `query` collects one result per subscriber, correlated by
//!   a fresh id and bounded by a timeout.
//! - **Modules**: bundles of registrations applied in one call.
//!
//! ## Example
//!
//! ```rust,ignore
//! use coffee_core::{Command, CommandFactory, Facade};
//!
//! let facade = Facade::<Hero>::with_defaults();
//! facade.register_command("CHANGE_NAME", CommandFactory::of::<ChangeName>());
//!
//! let mut hero = Hero { name: "Merlin".into() };
//! facade.send_notification("CHANGE_NAME", &mut hero).await?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `COFFEE_FACADE_NAME` | `facade` | Name attached to facade logs |
//! | `COFFEE_QUERY_TIMEOUT_MS` | `30000` | Upper bound for one query |

pub mod command;
pub mod component;
pub mod config;
pub mod error;
pub mod facade;
pub mod model;
pub mod module;
pub mod query;

pub use command::{Command, CommandFactory};
pub use component::{
    BasicMediator, BasicProxy, ComponentBinding, FacadeHandle, FacadeSlot, Mediator,
    MediatorBinding, Proxy, ProxyBinding, Service, ServiceBinding,
};
pub use config::{ConfigError, FacadeConfig, DEFAULT_QUERY_TIMEOUT};
pub use error::FacadeError;
pub use facade::Facade;
pub use model::{Merge, Model, StoreModel};
pub use module::{Module, ModuleConfiguration};
pub use query::QueryResponse;

pub use coffee_bus::{
    BusError, CorrelationId, HandlerError, Notification, NotificationHandler, SubscriptionId,
};
