mod app;
mod book;
mod cache;
mod config;
mod error;
mod filter;
mod form;
mod gateway;
mod notify;
mod observer;
mod preference;
mod projection;
mod render;
mod seed;
mod store;

#[cfg(feature = "http")]
pub mod http;

pub use app::{AppError, Bookshelf, EditMode, IntentOutcome, SubmitOutcome, ViewEvent, RELOAD_NOTICE};
pub use book::{month_label, Book, BookFields, BookId, ReadingStatus, StarRating, YearMonth};
pub use cache::LocalCache;
pub use config::{BookshelfConfig, ConfigError, RetryConfig};
pub use error::StoreError;
pub use filter::{FilterState, MonthFilter, StatusFilter};
pub use form::{EntryForm, FormError};
pub use gateway::{Confirm, DeleteOutcome, MutationGateway, DELETE_PROMPT};
pub use notify::{
    FanoutNotifier, Notification, NotificationKind, NotificationLog, Notifier, TracingNotifier,
    DEFAULT_TTL,
};
#[cfg(feature = "emitter")]
pub use notify::{EmitterNotifier, NOTIFICATION_EVENT};
pub use observer::{ObserverId, Observers};
pub use preference::{PreferenceError, PreferenceFile, Theme, THEME_KEY};
pub use projection::{month_options, project, project_books};
pub use render::{render, render_books, BookCard, Cover, EmptyState, Intent, RenderedGrid, NO_GENRE};
pub use seed::{sample_books, seed_if_empty};
pub use store::{
    connect, ConnectError, ConnectionState, FileRecordStore, InMemoryRecordStore, RecordStore,
    RetryPolicy, Snapshot, SnapshotListener, SubscriptionId,
};
