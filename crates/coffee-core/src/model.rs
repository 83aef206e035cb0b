//! # Models
//!
//! Proxies that hold application state.
//!
//! - [`Model`] keeps one optional value and replaces it wholesale.
//! - [`StoreModel`] keeps immutable snapshots. Each update merges a patch
//!   into the current snapshot, remembers the previous one, and can report
//!   whether a new snapshot appeared since the last check.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::component::{FacadeHandle, FacadeSlot, Proxy};
use crate::facade::Facade;

/// Proxy holding a single optional state value.
pub struct Model<S, P = (), R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    slot: FacadeSlot<P, R>,
    state: RwLock<Option<S>>,
}

impl<S, P, R> Model<S, P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: FacadeSlot::new(),
            state: RwLock::new(None),
        }
    }

    pub fn with_state(state: S) -> Self {
        Self {
            slot: FacadeSlot::new(),
            state: RwLock::new(Some(state)),
        }
    }

    pub fn set_state(&self, state: S) {
        *self.state.write() = Some(state);
    }

    pub fn state(&self) -> Option<S>
    where
        S: Clone,
    {
        self.state.read().clone()
    }

    /// Borrow the state without cloning it.
    pub fn read_state<T>(&self, f: impl FnOnce(Option<&S>) -> T) -> T {
        f(self.state.read().as_ref())
    }

    pub fn reset_state(&self) {
        *self.state.write() = None;
    }
}

impl<S, P, R> Default for Model<S, P, R>
where
    P: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P, R> Proxy<P, R> for Model<S, P, R>
where
    S: Send + Sync + 'static,
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

/// Combine a snapshot with a partial update.
pub trait Merge {
    /// Produce a new value with `patch` applied on top of `self`.
    fn merge(&self, patch: &Self) -> Self;
}

/// Shallow merge of JSON objects; any other shape is replaced by the patch.
impl Merge for Value {
    fn merge(&self, patch: &Self) -> Self {
        match (self, patch) {
            (Value::Object(current), Value::Object(changes)) => {
                let mut merged = current.clone();
                for (key, value) in changes {
                    merged.insert(key.clone(), value.clone());
                }
                Value::Object(merged)
            }
            _ => patch.clone(),
        }
    }
}

impl<K, V> Merge for HashMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn merge(&self, patch: &Self) -> Self {
        let mut merged = self.clone();
        merged.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

struct Snapshots<S> {
    current: Option<Arc<S>>,
    previous: Option<Arc<S>>,
    // Snapshot seen by the last `updated()` call.
    observed: Option<Arc<S>>,
}

/// Proxy holding immutable merged snapshots.
pub struct StoreModel<S, P = (), R = ()>
where
    P: Send + 'static,
    R: Send + 'static,
{
    slot: FacadeSlot<P, R>,
    snapshots: RwLock<Snapshots<S>>,
}

impl<S, P, R> StoreModel<S, P, R>
where
    S: Merge,
    P: Send + 'static,
    R: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            slot: FacadeSlot::new(),
            snapshots: RwLock::new(Snapshots {
                current: None,
                previous: None,
                observed: None,
            }),
        }
    }

    /// Merge `patch` into the current snapshot, producing a new one.
    ///
    /// The first update stores the patch as is.
    pub fn set_state(&self, patch: S) {
        let mut guard = self.snapshots.write();
        let snapshots = &mut *guard;
        let next = match snapshots.current.as_deref() {
            Some(current) => current.merge(&patch),
            None => patch,
        };
        snapshots.previous = snapshots.current.replace(Arc::new(next));
    }

    pub fn state(&self) -> Option<Arc<S>> {
        self.snapshots.read().current.clone()
    }

    /// Snapshot replaced by the most recent update.
    pub fn prev_state(&self) -> Option<Arc<S>> {
        self.snapshots.read().previous.clone()
    }

    /// Drop the current and previous snapshots.
    pub fn reset_state(&self) {
        let mut snapshots = self.snapshots.write();
        snapshots.current = None;
        snapshots.previous = None;
        snapshots.observed = None;
    }

    /// True once per new snapshot.
    pub fn updated(&self) -> bool {
        let mut snapshots = self.snapshots.write();
        let changed = match (&snapshots.current, &snapshots.observed) {
            (Some(current), Some(observed)) => !Arc::ptr_eq(current, observed),
            (None, None) => false,
            _ => true,
        };
        snapshots.observed = snapshots.current.clone();
        changed
    }
}

impl<S, P, R> Default for StoreModel<S, P, R>
where
    S: Merge,
    P: Send + 'static,
    R: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P, R> Proxy<P, R> for StoreModel<S, P, R>
where
    S: Send + Sync + 'static,
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
