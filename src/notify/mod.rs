//! Transient user notifications ("Book added successfully!", failures, the
//! terminal reload notice).
//!
//! The application only talks to the [`Notifier`] trait. [`NotificationLog`]
//! keeps everything in memory, [`TracingNotifier`] writes to the log, and
//! with the `emitter` feature [`EmitterNotifier`] fans notifications out to
//! `event-emitter-rs` listeners.

#[cfg(feature = "emitter")]
mod emitter;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[cfg(feature = "emitter")]
pub use emitter::{EmitterNotifier, NOTIFICATION_EVENT};

/// Default time a notification stays on screen.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Failure,
    /// Nothing more will happen without user action (e.g. reload).
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// How long to show it, in milliseconds. Zero means until dismissed.
    pub ttl_ms: u64,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            ttl_ms: DEFAULT_TTL.as_millis() as u64,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Failure,
            message: message.into(),
            ttl_ms: DEFAULT_TTL.as_millis() as u64,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Fatal,
            message: message.into(),
            ttl_ms: 0,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = ttl.as_millis() as u64;
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_ms > 0).then(|| Duration::from_millis(self.ttl_ms))
    }

    pub fn is_transient(&self) -> bool {
        self.ttl_ms > 0
    }
}

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Keeps every notification in memory. Clones share the log.
#[derive(Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.entries.lock().ok().and_then(|e| e.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(notification);
        }
    }
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => tracing::info!(text = %notification.message, "notification"),
            NotificationKind::Failure => tracing::warn!(text = %notification.message, "notification"),
            NotificationKind::Fatal => tracing::error!(text = %notification.message, "notification"),
        }
    }
}

/// Sends every notification to several sinks.
#[derive(Clone, Default)]
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Notifier>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notification: Notification) {
        for sink in &self.sinks {
            sink.notify(notification.clone());
        }
    }
}
