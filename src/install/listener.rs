//! Install event listeners
//!
//! Any number of surfaces may observe the same install (a list row, a
//! detail dialog, a batch screen), so registration is deliberately
//! unbounded and never deduplicated. Each registration hands back a
//! [`Subscription`]; dropping it removes the listener, which bounds
//! registry growth to live subscriptions without changing the broadcast
//! semantics. A listener that should outlive its handle can be detached.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::trace;

use super::request::InstallOutcome;

/// Observer of install lifecycle events.
///
/// Callbacks run on the orchestrator's event-pump task and must not block.
pub trait InstallListener: Send + Sync {
    fn on_install_event(&self, outcome: &InstallOutcome);
}

/// Registered listeners, keyed by registration id.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<u64, Arc<dyn InstallListener>>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a listener. The registration lives as long as the returned
    /// [`Subscription`] (or forever, after [`Subscription::detach`]).
    pub fn add_listener(
        registry: &Arc<Self>,
        listener: Arc<dyn InstallListener>,
    ) -> Subscription {
        let id = registry.next_id.fetch_add(1, Ordering::Relaxed);
        registry
            .listeners
            .lock()
            .expect("listener registry poisoned")
            .insert(id, listener);
        trace!(id, "listener registered");
        Subscription {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    /// Deliver one event to every currently registered listener.
    ///
    /// The listener set is snapshotted under the lock and invoked outside
    /// it, so listeners may register or unsubscribe from within callbacks.
    pub fn broadcast(&self, outcome: &InstallOutcome) {
        let snapshot: Vec<Arc<dyn InstallListener>> = self
            .listeners
            .lock()
            .expect("listener registry poisoned")
            .values()
            .cloned()
            .collect();

        trace!(
            listeners = snapshot.len(),
            "broadcasting {:?}",
            outcome
        );
        for listener in snapshot {
            listener.on_install_event(outcome);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .expect("listener registry poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: u64) {
        self.listeners
            .lock()
            .expect("listener registry poisoned")
            .remove(&id);
        trace!(id, "listener removed");
    }
}

/// Handle tying a registration to its owner's lifetime.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<ListenerRegistry>,
}

impl Subscription {
    /// Remove the listener now.
    pub fn unsubscribe(self) {
        // Drop does the work.
    }

    /// Leave the listener registered for the registry's whole lifetime.
    pub fn detach(mut self) {
        self.registry = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}
