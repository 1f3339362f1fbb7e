//! Record Store - the boundary to wherever book records actually live.
//!
//! A store is an opaque keyed collection that accepts inserts, updates and
//! deletes, and pushes the *full* current snapshot (newest first by
//! creation time) to every subscriber whenever anything changes.
//!
//! ## Example
//!
//! ```ignore
//! use bookshelf::{BookFields, InMemoryRecordStore, RecordStore};
//!
//! let store = InMemoryRecordStore::new();
//! store.subscribe(Box::new(|snapshot| println!("{} books", snapshot.len())))?;
//! let id = store.insert(BookFields::new("Dune", "Frank Herbert"))?;
//! store.delete(&id)?;
//! ```

mod connect;
mod file;
mod in_memory;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::book::{Book, BookFields, BookId};
use crate::error::StoreError;

pub use connect::{connect, ConnectError, ConnectionState, RetryPolicy};
pub use file::FileRecordStore;
pub use in_memory::InMemoryRecordStore;

/// Every record in the store, ordered by creation time, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    books: Vec<Book>,
}

impl Snapshot {
    /// Build a snapshot, enforcing the newest-first ordering.
    pub fn new(mut books: Vec<Book>) -> Self {
        books.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { books }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn into_books(self) -> Vec<Book> {
        self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: &BookId) -> Option<&Book> {
        self.books.iter().find(|book| &book.id == id)
    }
}

/// Handle returned by [`RecordStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn new(raw: u64) -> Self {
        SubscriptionId(raw)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscription-{}", self.0)
    }
}

/// Callback receiving every pushed snapshot.
pub type SnapshotListener = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// Abstract record storage with change notification.
///
/// There is no version check: concurrent writers race and the last
/// accepted write wins.
pub trait RecordStore: Send + Sync {
    /// Insert a new record. The store assigns the id and creation timestamp.
    fn insert(&self, fields: BookFields) -> Result<BookId, StoreError>;

    /// Replace the fields of an existing record and stamp its update time.
    fn update(&self, id: &BookId, fields: BookFields) -> Result<(), StoreError>;

    /// Remove a record.
    fn delete(&self, id: &BookId) -> Result<(), StoreError>;

    /// The current contents, newest first.
    fn snapshot(&self) -> Result<Snapshot, StoreError>;

    /// Register a listener. It receives the current snapshot immediately and
    /// a fresh snapshot after every accepted mutation.
    fn subscribe(&self, listener: SnapshotListener) -> Result<SubscriptionId, StoreError>;

    /// Remove a listener. Returns true if it was registered.
    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Arc<S> {
    fn insert(&self, fields: BookFields) -> Result<BookId, StoreError> {
        (**self).insert(fields)
    }

    fn update(&self, id: &BookId, fields: BookFields) -> Result<(), StoreError> {
        (**self).update(id, fields)
    }

    fn delete(&self, id: &BookId) -> Result<(), StoreError> {
        (**self).delete(id)
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        (**self).snapshot()
    }

    fn subscribe(&self, listener: SnapshotListener) -> Result<SubscriptionId, StoreError> {
        (**self).subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, StoreError> {
        (**self).unsubscribe(id)
    }
}
