use std::sync::Arc;
use std::time::Duration;

use bookshelf::{
    Bookshelf, ConnectionState, InMemoryRecordStore, NotificationKind, NotificationLog,
    RecordStore, RetryPolicy, StoreError, ViewEvent, RELOAD_NOTICE,
};

use crate::support::record_events;

#[test]
fn store_that_comes_up_late_is_picked_up() {
    let store = InMemoryRecordStore::offline();
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));

    let handle = store.clone();
    let mut attempts = 0;
    let state = shelf.connect(&RetryPolicy::immediate(4), || {
        attempts += 1;
        if attempts == 2 {
            handle.set_available(true);
        }
        Ok(Arc::new(handle.clone()) as Arc<dyn RecordStore>)
    });

    assert_eq!(state, ConnectionState::Connected { attempts: 2 });
    assert_eq!(store.subscriber_count(), 1);

    for fields in bookshelf::sample_books() {
        store.insert(fields).unwrap();
    }
    assert_eq!(shelf.cached_len().unwrap(), 2);
    assert!(log.is_empty());
}

#[test]
fn backoff_waits_between_attempts() {
    let policy = RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
        factor: 2.0,
    };
    let mut shelf = Bookshelf::new(Arc::new(NotificationLog::new()));

    let started = std::time::Instant::now();
    let state = shelf.connect(&policy, || {
        Err(StoreError::Unavailable("not yet".into()))
    });

    assert!(matches!(state, ConnectionState::Exhausted { attempts: 3, .. }));
    assert!(started.elapsed() >= Duration::from_millis(20));
}

#[test]
fn exhausted_retries_leave_an_empty_grid_and_a_reload_notice() {
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));
    let seen = record_events(&shelf);

    let mut attempts = 0;
    let state = shelf.connect(&RetryPolicy::immediate(5), || {
        attempts += 1;
        Err(StoreError::Unavailable("store client not initialized".into()))
    });

    assert_eq!(attempts, 5);
    assert!(state.is_terminal_failure());
    assert_eq!(shelf.connection().unwrap(), state);

    let notice = log.latest().unwrap();
    assert_eq!(notice.kind, NotificationKind::Fatal);
    assert_eq!(notice.message, RELOAD_NOTICE);
    assert!(!notice.is_transient());

    assert!(shelf.render().unwrap().is_empty());
    assert_eq!(
        *seen.lock().unwrap(),
        vec![ViewEvent::ConnectionChanged(state)]
    );
}

#[test]
fn non_retryable_failure_stops_immediately() {
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));

    let mut attempts = 0;
    let state = shelf.connect(&RetryPolicy::immediate(5), || {
        attempts += 1;
        Err(StoreError::Io("permission denied".into()))
    });

    assert_eq!(attempts, 1);
    assert!(matches!(state, ConnectionState::Rejected(_)));
    assert_eq!(log.latest().unwrap().kind, NotificationKind::Fatal);
}

#[test]
fn attach_to_offline_store_reports_failure() {
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));

    assert!(shelf.attach(Arc::new(InMemoryRecordStore::offline())).is_err());
    assert_eq!(log.latest().unwrap().kind, NotificationKind::Failure);
    assert_eq!(shelf.connection().unwrap(), ConnectionState::Disconnected);
}

#[cfg(feature = "emitter")]
#[test]
fn notifications_fan_out_to_emitter_listeners() {
    use bookshelf::{EmitterNotifier, FanoutNotifier, Notification};
    use std::sync::Mutex;
    use std::time::Instant;

    let received = Arc::new(Mutex::new(Vec::<Notification>::new()));
    let emitter = EmitterNotifier::new();
    let sink = Arc::clone(&received);
    emitter
        .on_notification(move |n| sink.lock().unwrap().push(n))
        .unwrap();

    let log = NotificationLog::new();
    let fanout = FanoutNotifier::new()
        .with(Arc::new(log.clone()))
        .with(Arc::new(emitter));
    let mut shelf = Bookshelf::new(Arc::new(fanout));
    shelf.attach(Arc::new(InMemoryRecordStore::new())).unwrap();

    shelf.open_add_form().unwrap();
    shelf
        .submit(&bookshelf::EntryForm {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(log.len(), 1);

    // event-emitter-rs delivers on its own threads
    let deadline = Instant::now() + Duration::from_secs(2);
    while received.lock().unwrap().is_empty() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    let received = received.lock().unwrap();
    assert_eq!(received[0].message, "Book added successfully!");
}
