use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use bookshelf::{
    BookFields, Bookshelf, FileRecordStore, InMemoryRecordStore, NotificationKind,
    NotificationLog, RecordStore, Snapshot,
};

#[test]
fn cache_keeps_the_newest_snapshot_when_writers_overlap() {
    let store = InMemoryRecordStore::new();

    // Registered ahead of the shelf: stalls delivery of the first insert.
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);
    let release_rx = Mutex::new(release_rx);
    let armed = Arc::new(AtomicBool::new(false));
    let gate_armed = Arc::clone(&armed);
    store
        .subscribe(Box::new(move |snapshot: &Snapshot| {
            if snapshot.len() == 1 && gate_armed.swap(false, Ordering::SeqCst) {
                entered_tx.lock().unwrap().send(()).unwrap();
                release_rx.lock().unwrap().recv().unwrap();
            }
        }))
        .unwrap();

    let mut shelf = Bookshelf::new(Arc::new(NotificationLog::new()));
    shelf.attach(Arc::new(store.clone())).unwrap();
    armed.store(true, Ordering::SeqCst);

    let first = {
        let store = store.clone();
        std::thread::spawn(move || store.insert(BookFields::new("First", "A")))
    };
    entered_rx.recv().unwrap();
    let second = {
        let store = store.clone();
        std::thread::spawn(move || store.insert(BookFields::new("Second", "B")))
    };
    std::thread::sleep(Duration::from_millis(50));
    release_tx.send(()).unwrap();

    first.join().unwrap().unwrap();
    second.join().unwrap().unwrap();

    assert_eq!(store.snapshot().unwrap().len(), 2);
    assert_eq!(shelf.cached_len().unwrap(), 2);
}

#[test]
fn parallel_adds_on_a_file_store_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.json");
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));
    shelf
        .attach(Arc::new(FileRecordStore::open(&path).unwrap()))
        .unwrap();
    let gateway = shelf.gateway().unwrap();

    std::thread::scope(|scope| {
        for t in 0..8 {
            scope.spawn(move || {
                for i in 0..20 {
                    gateway
                        .create(BookFields::new(format!("{t}-{i}"), "A"))
                        .unwrap();
                }
            });
        }
    });

    let entries = log.entries();
    assert_eq!(entries.len(), 160);
    assert!(entries
        .iter()
        .all(|n| n.kind == NotificationKind::Success));
    assert_eq!(shelf.cached_len().unwrap(), 160);
    assert_eq!(
        FileRecordStore::open(&path).unwrap().snapshot().unwrap().len(),
        160
    );
}
