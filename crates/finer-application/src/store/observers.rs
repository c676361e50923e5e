//! Change listeners for the store.

use finer_core::SessionDocument;
use std::sync::{Arc, Mutex, MutexGuard};

/// Receives the changed path and the document as it stands after the write.
pub type Listener = Arc<dyn Fn(&str, &SessionDocument) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Listener list shared by a store and its subscription handles.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    registry: Arc<Mutex<Registry>>,
}

impl Observers {
    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn add(&self, listener: Listener) -> Subscription {
        let mut registry = self.lock();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, listener));
        Subscription {
            id,
            observers: self.clone(),
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut registry = self.lock();
        let before = registry.listeners.len();
        registry.listeners.retain(|(lid, _)| *lid != id);
        registry.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Calls every listener registered at the time of the call.
    ///
    /// The registry lock is released before any listener runs, so listeners
    /// may subscribe or unsubscribe from inside a notification.
    pub(crate) fn notify(&self, path: &str, doc: &SessionDocument) {
        let listeners: Vec<Listener> = self
            .lock()
            .listeners
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(path, doc);
        }
    }
}

/// Handle returned by `subscribe`. Dropping it keeps the listener attached.
#[derive(Clone)]
pub struct Subscription {
    id: u64,
    observers: Observers,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Detaches the listener. Returns false if it was already detached.
    pub fn unsubscribe(&self) -> bool {
        self.observers.remove(self.id)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
