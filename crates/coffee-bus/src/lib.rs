//! # Coffee Bus - Named-Channel Notification Bus
//!
//! The publish/subscribe primitive underneath the facade.
//!
//! ## Delivery Rules
//!
//! - Handlers subscribe to a channel name and run in subscription order.
//! - `emit` awaits every handler in turn before returning; nothing is queued.
//! - `emit_collect` does the same and hands back each handler's result in
//!   subscription order.
//! - The subscriber list is snapshotted when an emit starts, so subscribing
//!   or unsubscribing mid-dispatch only affects later emits.
//! - A failing handler aborts the emit; later handlers do not run.
//!
//! ```text
//!   emit("CHANGE_NAME", &mut notification)
//!          │
//!          ▼
//!   ┌──────────────┐   handle()   ┌───────────┐
//!   │  channel     │ ───────────▶ │ handler 1 │ ──▶ R
//!   │ CHANGE_NAME  │ ───────────▶ │ handler 2 │ ──▶ R
//!   └──────────────┘              └───────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod bus;
pub mod correlation;
pub mod handler;
pub mod notification;

pub use bus::{BusError, NotificationBus, SubscriptionId};
pub use correlation::CorrelationId;
pub use handler::{FnHandler, HandlerError, NotificationHandler};
pub use notification::Notification;
