//! InMemoryRecordStore - HashMap-backed record store with synchronous snapshot push.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::{DateTime, Utc};

use super::{RecordStore, Snapshot, SnapshotListener, SubscriptionId};
use crate::book::{Book, BookFields, BookId};
use crate::error::StoreError;

type SharedListener = Arc<dyn Fn(&Snapshot) + Send + Sync>;

#[derive(Default)]
struct Records {
    books: HashMap<BookId, Book>,
    last_created: Option<DateTime<Utc>>,
}

impl Records {
    /// Server-side creation stamp, strictly increasing so the snapshot order is total.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_created {
            Some(last) if now <= last => last + chrono::Duration::milliseconds(1),
            _ => now,
        };
        self.last_created = Some(stamp);
        stamp
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.books.values().cloned().collect())
    }
}

/// In-memory record store.
///
/// Clone-friendly via Arc; clones share records and subscribers. Listeners
/// run on the mutating thread after the storage lock is released, but under
/// the delivery lock, so every subscriber sees snapshots in mutation order.
/// A listener may read the store; it must not mutate it.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Records>>,
    listeners: Arc<RwLock<Vec<(SubscriptionId, SharedListener)>>>,
    delivery: Arc<Mutex<()>>,
    next_subscription: Arc<AtomicU64>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Records::default())),
            listeners: Arc::new(RwLock::new(Vec::new())),
            delivery: Arc::new(Mutex::new(())),
            next_subscription: Arc::new(AtomicU64::new(1)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a store whose client is not initialized yet. Every call fails
    /// with [`StoreError::Unavailable`] until [`set_available`](Self::set_available).
    pub fn offline() -> Self {
        let store = Self::new();
        store.set_available(false);
        store
    }

    /// Create a store pre-populated with existing records (ids and stamps kept).
    pub fn with_books(books: Vec<Book>) -> Self {
        let store = Self::new();
        if let Ok(mut records) = store.records.write() {
            records.last_created = books.iter().map(|book| book.created_at).max();
            records.books = books
                .into_iter()
                .map(|book| (book.id.clone(), book))
                .collect();
        }
        store
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store client not initialized".into()))
        }
    }

    fn delivery_guard(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.delivery
            .lock()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    /// Apply `change` under the storage lock, then push the resulting snapshot
    /// before any later mutation can.
    fn mutate<R>(
        &self,
        operation: &'static str,
        change: impl FnOnce(&mut Records) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        self.ensure_available()?;
        let _delivery = self.delivery_guard(operation)?;
        let (result, snapshot) = {
            let mut records = self
                .records
                .write()
                .map_err(|_| StoreError::LockPoisoned(operation))?;
            let result = change(&mut records)?;
            (result, records.snapshot())
        };
        self.publish(&snapshot)?;
        Ok(result)
    }

    fn publish(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let listeners: Vec<SharedListener> = self
            .listeners
            .read()
            .map_err(|_| StoreError::LockPoisoned("listeners read"))?
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::trace!(
            books = snapshot.len(),
            listeners = listeners.len(),
            "pushing snapshot"
        );
        for listener in listeners {
            listener(snapshot);
        }
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn insert(&self, fields: BookFields) -> Result<BookId, StoreError> {
        let id = self.mutate("insert", |records| {
            let id = BookId::generate();
            let created_at = records.next_created_at();
            records.books.insert(
                id.clone(),
                Book {
                    id: id.clone(),
                    fields,
                    created_at,
                    updated_at: None,
                },
            );
            Ok(id)
        })?;
        tracing::debug!(%id, "record inserted");
        Ok(id)
    }

    fn update(&self, id: &BookId, fields: BookFields) -> Result<(), StoreError> {
        self.mutate("update", |records| {
            let book = records
                .books
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            book.fields = fields;
            book.updated_at = Some(Utc::now());
            Ok(())
        })?;
        tracing::debug!(%id, "record updated");
        Ok(())
    }

    fn delete(&self, id: &BookId) -> Result<(), StoreError> {
        self.mutate("delete", |records| match records.books.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id.clone())),
        })?;
        tracing::debug!(%id, "record deleted");
        Ok(())
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        self.ensure_available()?;
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::LockPoisoned("snapshot"))?;
        Ok(records.snapshot())
    }

    /// Registers only once the initial snapshot has been read; a failed
    /// subscribe leaves no listener behind.
    fn subscribe(&self, listener: SnapshotListener) -> Result<SubscriptionId, StoreError> {
        self.ensure_available()?;
        let _delivery = self.delivery_guard("subscribe")?;
        let current = self.snapshot()?;

        let id = SubscriptionId::new(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let listener: SharedListener = Arc::from(listener);
        self.listeners
            .write()
            .map_err(|_| StoreError::LockPoisoned("subscribe"))?
            .push((id, Arc::clone(&listener)));

        tracing::debug!(%id, books = current.len(), "subscriber registered");
        listener(&current);
        Ok(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, StoreError> {
        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| StoreError::LockPoisoned("unsubscribe"))?;
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        Ok(listeners.len() != before)
    }
}
