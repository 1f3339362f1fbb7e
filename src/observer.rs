//! Synchronous observer registry.
//!
//! Stands in for display-event wiring: the application emits typed events and
//! whatever renders them (a terminal, an HTTP layer, a test) subscribes here.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Callback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Typed observer list. Clones share the registry.
pub struct Observers<E> {
    callbacks: Arc<RwLock<Vec<(ObserverId, Callback<E>)>>>,
    next_id: Arc<AtomicU64>,
}

impl<E> Clone for Observers<E> {
    fn clone(&self) -> Self {
        Self {
            callbacks: Arc::clone(&self.callbacks),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Observers<E> {
    pub fn new() -> Self {
        Self {
            callbacks: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        match self.callbacks.write() {
            Ok(mut callbacks) => callbacks.push((id, Arc::new(callback))),
            Err(_) => tracing::error!("observer registry lock poisoned"),
        }
        id
    }

    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        match self.callbacks.write() {
            Ok(mut callbacks) => {
                let before = callbacks.len();
                callbacks.retain(|(existing, _)| *existing != id);
                callbacks.len() != before
            }
            Err(_) => false,
        }
    }

    /// Call every observer in subscription order. Observers may subscribe or
    /// unsubscribe from inside a callback; the change applies to the next emit.
    pub fn emit(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = match self.callbacks.read() {
            Ok(callbacks) => callbacks.iter().map(|(_, cb)| Arc::clone(cb)).collect(),
            Err(_) => {
                tracing::error!("observer registry lock poisoned");
                return;
            }
        };
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
