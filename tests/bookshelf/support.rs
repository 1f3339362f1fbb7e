//! Shared fixtures for bookshelf tests.

use std::sync::{Arc, Mutex};

use bookshelf::{Bookshelf, InMemoryRecordStore, NotificationLog, ViewEvent};

/// A shelf attached to a fresh in-memory store.
pub fn attached_shelf() -> (InMemoryRecordStore, NotificationLog, Bookshelf) {
    let store = InMemoryRecordStore::new();
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));
    shelf.attach(Arc::new(store.clone())).unwrap();
    (store, log, shelf)
}

/// Collect every view event the shelf emits from now on.
pub fn record_events(shelf: &Bookshelf) -> Arc<Mutex<Vec<ViewEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    shelf.observe(move |event| sink.lock().unwrap().push(event.clone()));
    seen
}

pub fn titles(books: &[bookshelf::Book]) -> Vec<String> {
    books.iter().map(|b| b.title().to_string()).collect()
}
