//! FileRecordStore - write-through JSON persistence on top of the in-memory store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{InMemoryRecordStore, RecordStore, Snapshot, SnapshotListener, SubscriptionId};
use crate::book::{Book, BookFields, BookId};
use crate::error::StoreError;

/// Record store persisted to a single JSON file.
///
/// The file holds the snapshot array. It is read once on open and rewritten
/// after every accepted mutation. A mutation and its file write happen under
/// one lock, so writes land in mutation order and never share the temp file.
#[derive(Clone)]
pub struct FileRecordStore {
    inner: InMemoryRecordStore,
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileRecordStore {
    /// Open (or lazily create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let books: Vec<Book> = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            Vec::new()
        };
        tracing::info!(path = %path.display(), books = books.len(), "opened record file");

        Ok(Self {
            inner: InMemoryRecordStore::with_books(books),
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::LockPoisoned("file write"))
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = self.inner.snapshot()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(&snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn persist_logged(&self, operation: &str) -> Result<(), StoreError> {
        self.persist().map_err(|err| {
            tracing::error!(path = %self.path.display(), operation, error = %err, "failed to persist records");
            err
        })
    }
}

impl RecordStore for FileRecordStore {
    fn insert(&self, fields: BookFields) -> Result<BookId, StoreError> {
        let _guard = self.write_guard()?;
        let id = self.inner.insert(fields)?;
        self.persist_logged("insert")?;
        Ok(id)
    }

    fn update(&self, id: &BookId, fields: BookFields) -> Result<(), StoreError> {
        let _guard = self.write_guard()?;
        self.inner.update(id, fields)?;
        self.persist_logged("update")
    }

    fn delete(&self, id: &BookId) -> Result<(), StoreError> {
        let _guard = self.write_guard()?;
        self.inner.delete(id)?;
        self.persist_logged("delete")
    }

    fn snapshot(&self) -> Result<Snapshot, StoreError> {
        self.inner.snapshot()
    }

    fn subscribe(&self, listener: SnapshotListener) -> Result<SubscriptionId, StoreError> {
        self.inner.subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, StoreError> {
        self.inner.unsubscribe(id)
    }
}
