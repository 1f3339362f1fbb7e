use std::sync::Mutex;

use event_emitter_rs::EventEmitter;

use super::{Notification, Notifier};

/// Event name every notification is emitted under.
pub const NOTIFICATION_EVENT: &str = "notification";

/// Notifier backed by an `event-emitter-rs` emitter.
///
/// Listeners run on emitter threads, so delivery is asynchronous relative
/// to the mutation that raised the notification.
///
/// # Example
///
/// ```ignore
/// use bookshelf::EmitterNotifier;
///
/// let notifier = EmitterNotifier::new();
/// notifier.on_notification(|n| println!("{}", n.message));
/// ```
pub struct EmitterNotifier {
    emitter: Mutex<EventEmitter>,
}

impl Default for EmitterNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmitterNotifier {
    pub fn new() -> Self {
        Self {
            emitter: Mutex::new(EventEmitter::new()),
        }
    }

    /// Register a listener; returns the emitter's listener id.
    pub fn on_notification<F>(&self, listener: F) -> Option<String>
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        let mut emitter = self.emitter.lock().ok()?;
        Some(emitter.on(NOTIFICATION_EVENT, listener))
    }
}

impl Notifier for EmitterNotifier {
    fn notify(&self, notification: Notification) {
        match self.emitter.lock() {
            Ok(mut emitter) => {
                let _ = emitter.emit(NOTIFICATION_EVENT, notification);
            }
            Err(_) => tracing::error!("notification emitter lock poisoned"),
        }
    }
}
