//! Explicit publish/subscribe for change notifications.
//!
//! Each notifier owns its listeners; callers receive a [`SubscriptionId`]
//! on registration and hand it back to unregister.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Registry of change callbacks with a single dispatch point.
pub struct ChangeNotifier<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Callback<E>)>>,
}

impl<E> ChangeNotifier<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback. It stays registered until [`Self::unsubscribe`].
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Dispatch an event to every registered callback.
    ///
    /// Callbacks run outside the listener lock, so they may subscribe or
    /// unsubscribe re-entrantly.
    pub fn notify(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self.lock().iter().map(|(_, cb)| Arc::clone(cb)).collect();
        for callback in snapshot {
            callback(event);
        }
    }

    /// Drop every registered callback.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Callback<E>)>> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<E> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for ChangeNotifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
