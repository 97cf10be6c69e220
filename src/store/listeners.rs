//! Change notification for the expiring store.
//!
//! Callbacks are registered with [`ExpiringStore::subscribe`] and invoked
//! synchronously after a mutation has been persisted. Each registration
//! is removed individually through its [`Subscription`].
//!
//! [`ExpiringStore::subscribe`]: super::ExpiringStore::subscribe

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// A persisted change to one key. Keys are caller-visible (no namespace).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A value was written.
    Set { key: String },
    /// A value was removed on request.
    Removed { key: String },
    /// An expired value was removed on read.
    Evicted { key: String },
}

impl StoreEvent {
    /// Key the event refers to.
    pub fn key(&self) -> &str {
        match self {
            Self::Set { key } | Self::Removed { key } | Self::Evicted { key } => key,
        }
    }
}

type Callback = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Registered callbacks keyed by registration id.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: AtomicU64,
    callbacks: RwLock<HashMap<u64, Callback>>,
}

impl Listeners {
    pub(crate) fn add(self: &Arc<Self>, callback: Callback) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks.write().insert(id, callback);
        Subscription {
            id,
            listeners: Arc::downgrade(self),
        }
    }

    fn remove(&self, id: u64) -> bool {
        self.callbacks.write().remove(&id).is_some()
    }

    /// Notify every listener. Callbacks run outside the lock so they may
    /// subscribe or unsubscribe themselves.
    pub(crate) fn notify(&self, event: &StoreEvent) {
        let callbacks: Vec<Callback> = {
            let guard = self.callbacks.read();
            if guard.is_empty() {
                return;
            }
            guard.values().cloned().collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.callbacks.read().len()
    }
}

/// Handle to one listener registration.
///
/// Dropping the handle leaves the listener registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
#[must_use = "dropping a Subscription keeps the listener registered forever"]
pub struct Subscription {
    id: u64,
    listeners: Weak<Listeners>,
}

impl Subscription {
    /// Removes exactly this registration.
    ///
    /// Returns false if the store has already been dropped.
    pub fn unsubscribe(self) -> bool {
        self.listeners
            .upgrade()
            .is_some_and(|listeners| listeners.remove(self.id))
    }
}
