//! Bookshelf - the application state and every transition on it.
//!
//! All mutable state (the local cache, the filters, the entry-form mode and
//! the connection status) lives in one [`ViewState`] value that only changes
//! through the methods here. Each change re-renders the whole grid and tells
//! observers about it.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookshelf::{Bookshelf, EntryForm, InMemoryRecordStore, NotificationLog, ViewEvent};
//!
//! let mut shelf = Bookshelf::new(Arc::new(NotificationLog::new()));
//! shelf.observe(|event| {
//!     if let ViewEvent::Rendered(grid) = event {
//!         println!("{} cards", grid.cards.len());
//!     }
//! });
//! shelf.attach(Arc::new(InMemoryRecordStore::new()))?;
//!
//! shelf.open_add_form()?;
//! shelf.submit(&EntryForm { title: "Dune".into(), author: "Frank Herbert".into(), ..Default::default() })?;
//! ```

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::book::{Book, BookId};
use crate::cache::LocalCache;
use crate::error::StoreError;
use crate::filter::{FilterState, MonthFilter, StatusFilter};
use crate::form::{EntryForm, FormError};
use crate::gateway::{Confirm, DeleteOutcome, MutationGateway};
use crate::notify::{Notification, Notifier};
use crate::observer::{ObserverId, Observers};
use crate::projection::{month_options, project, project_books};
use crate::render::{render, render_books, BookCard, Intent, RenderedGrid};
use crate::store::{connect, ConnectionState, RecordStore, RetryPolicy, Snapshot, SubscriptionId};

pub const RELOAD_NOTICE: &str =
    "Unable to connect to the book database. Please reload the page to try again.";

#[derive(Debug)]
pub enum AppError {
    /// No record store attached yet.
    NotConnected,
    /// The entry form is not open.
    FormNotOpen,
    UnknownBook(BookId),
    Form(FormError),
    Store(StoreError),
    LockPoisoned(&'static str),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotConnected => write!(f, "not connected to a record store"),
            AppError::FormNotOpen => write!(f, "entry form is not open"),
            AppError::UnknownBook(id) => write!(f, "no book with id {}", id),
            AppError::Form(e) => write!(f, "invalid entry: {}", e),
            AppError::Store(e) => write!(f, "{}", e),
            AppError::LockPoisoned(operation) => {
                write!(f, "application state lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Form(e) => Some(e),
            AppError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        AppError::Form(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

/// Which way the entry form will submit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Closed,
    Adding,
    Editing(BookId),
}

impl EditMode {
    pub fn is_open(&self) -> bool {
        !matches!(self, EditMode::Closed)
    }
}

/// What observers are told.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Rendered(RenderedGrid),
    /// The search box was cleared and should take focus again.
    FocusSearch,
    FormOpened { mode: EditMode, form: EntryForm },
    FormClosed,
    DetailOpened(BookCard),
    ConnectionChanged(ConnectionState),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(BookId),
    Updated(BookId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Detail(BookCard),
    Editing(EntryForm),
    Delete(DeleteOutcome),
}

#[derive(Debug, Default)]
struct ViewState {
    cache: LocalCache,
    filter: FilterState,
    edit: EditMode,
    connection: ConnectionState,
}

pub struct Bookshelf {
    state: Arc<RwLock<ViewState>>,
    observers: Observers<ViewEvent>,
    notifier: Arc<dyn Notifier>,
    gateway: Option<MutationGateway>,
    subscription: Option<SubscriptionId>,
}

impl Bookshelf {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ViewState::default())),
            observers: Observers::new(),
            notifier,
            gateway: None,
            subscription: None,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, ViewState>, AppError> {
        self.state
            .read()
            .map_err(|_| AppError::LockPoisoned("read"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ViewState>, AppError> {
        self.state
            .write()
            .map_err(|_| AppError::LockPoisoned("write"))
    }

    // --- observers ---------------------------------------------------------

    pub fn observe<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&ViewEvent) + Send + Sync + 'static,
    {
        self.observers.subscribe(callback)
    }

    pub fn unobserve(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    // --- connection --------------------------------------------------------

    /// Register the snapshot listener that keeps the cache current.
    fn subscribe_to(&self, store: &dyn RecordStore) -> Result<SubscriptionId, StoreError> {
        let state = Arc::clone(&self.state);
        let observers = self.observers.clone();
        store.subscribe(Box::new(move |snapshot: &Snapshot| {
            let grid = match state.write() {
                Ok(mut state) => {
                    state.cache.replace(snapshot.clone());
                    render(&state.cache, &state.filter)
                }
                Err(_) => {
                    tracing::error!("application state lock poisoned, dropping snapshot");
                    return;
                }
            };
            tracing::debug!(books = snapshot.len(), visible = grid.cards.len(), "snapshot applied");
            observers.emit(&ViewEvent::Rendered(grid));
        }))
    }

    fn set_connection(&self, connection: ConnectionState) -> Result<(), AppError> {
        self.write()?.connection = connection.clone();
        self.observers.emit(&ViewEvent::ConnectionChanged(connection));
        Ok(())
    }

    fn install(&mut self, store: Arc<dyn RecordStore>, subscription: SubscriptionId) {
        self.gateway = Some(MutationGateway::new(store, Arc::clone(&self.notifier)));
        self.subscription = Some(subscription);
    }

    /// Subscribe to an already-available store.
    pub fn attach(&mut self, store: Arc<dyn RecordStore>) -> Result<SubscriptionId, AppError> {
        match self.subscribe_to(store.as_ref()) {
            Ok(subscription) => {
                self.install(store, subscription);
                self.set_connection(ConnectionState::Connected { attempts: 1 })?;
                Ok(subscription)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to subscribe to record store");
                self.notifier
                    .notify(Notification::failure("Error loading books. Please try again."));
                Err(AppError::Store(err))
            }
        }
    }

    /// Obtain a store and subscribe, retrying while it is unavailable.
    ///
    /// On exhaustion the grid stays empty, a fatal notice asks the user to
    /// reload, and the returned state is terminal.
    pub fn connect<F>(&mut self, policy: &RetryPolicy, mut attempt: F) -> ConnectionState
    where
        F: FnMut() -> Result<Arc<dyn RecordStore>, StoreError>,
    {
        let result = connect(policy, || {
            let store = attempt()?;
            let subscription = self.subscribe_to(store.as_ref())?;
            Ok((store, subscription))
        });

        let state = match result {
            Ok(((store, subscription), attempts)) => {
                self.install(store, subscription);
                ConnectionState::Connected { attempts }
            }
            Err(err) => {
                self.notifier.notify(Notification::fatal(RELOAD_NOTICE));
                ConnectionState::from(err)
            }
        };
        if let Err(err) = self.set_connection(state.clone()) {
            tracing::error!(error = %err, "could not record connection state");
        }
        state
    }

    pub fn connection(&self) -> Result<ConnectionState, AppError> {
        Ok(self.read()?.connection.clone())
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    pub fn gateway(&self) -> Result<&MutationGateway, AppError> {
        self.gateway.as_ref().ok_or(AppError::NotConnected)
    }

    // --- filters -----------------------------------------------------------

    fn update_filter(&self, change: impl FnOnce(&mut FilterState)) -> Result<RenderedGrid, AppError> {
        let grid = {
            let mut state = self.write()?;
            change(&mut state.filter);
            render(&state.cache, &state.filter)
        };
        self.observers.emit(&ViewEvent::Rendered(grid.clone()));
        Ok(grid)
    }

    pub fn set_query(&self, query: impl Into<String>) -> Result<RenderedGrid, AppError> {
        let query = query.into();
        self.update_filter(|filter| filter.query = query)
    }

    /// Empty the search box and hand focus back to it.
    pub fn clear_search(&self) -> Result<RenderedGrid, AppError> {
        let grid = self.update_filter(FilterState::clear_query)?;
        self.observers.emit(&ViewEvent::FocusSearch);
        Ok(grid)
    }

    pub fn set_month_filter(&self, month: impl Into<MonthFilter>) -> Result<RenderedGrid, AppError> {
        let month = month.into();
        self.update_filter(|filter| filter.month = month)
    }

    pub fn set_status_filter(
        &self,
        status: impl Into<StatusFilter>,
    ) -> Result<RenderedGrid, AppError> {
        let status = status.into();
        self.update_filter(|filter| filter.status = status)
    }

    pub fn set_filter(&self, filter: FilterState) -> Result<RenderedGrid, AppError> {
        self.update_filter(|current| *current = filter)
    }

    pub fn filter(&self) -> Result<FilterState, AppError> {
        Ok(self.read()?.filter.clone())
    }

    // --- views -------------------------------------------------------------

    /// The projected books under the current filters.
    pub fn books(&self) -> Result<Vec<Book>, AppError> {
        let state = self.read()?;
        Ok(project(&state.cache, &state.filter))
    }

    pub fn render(&self) -> Result<RenderedGrid, AppError> {
        let state = self.read()?;
        Ok(render(&state.cache, &state.filter))
    }

    /// Render under `filter` without touching the application's own filters.
    pub fn render_with(&self, filter: &FilterState) -> Result<RenderedGrid, AppError> {
        let state = self.read()?;
        let visible = project_books(state.cache.books(), filter);
        Ok(render_books(&visible, state.cache.len(), filter))
    }

    pub fn month_options(&self) -> Result<Vec<String>, AppError> {
        Ok(month_options(&self.read()?.cache))
    }

    pub fn cached_len(&self) -> Result<usize, AppError> {
        Ok(self.read()?.cache.len())
    }

    pub fn book(&self, id: &BookId) -> Result<Book, AppError> {
        self.read()?
            .cache
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownBook(id.clone()))
    }

    pub fn open_detail(&self, id: &BookId) -> Result<BookCard, AppError> {
        let card = BookCard::from_book(&self.book(id)?);
        self.observers.emit(&ViewEvent::DetailOpened(card.clone()));
        Ok(card)
    }

    // --- entry form --------------------------------------------------------

    pub fn edit_mode(&self) -> Result<EditMode, AppError> {
        Ok(self.read()?.edit.clone())
    }

    fn open_form(&self, mode: EditMode, form: EntryForm) -> Result<EntryForm, AppError> {
        self.write()?.edit = mode.clone();
        self.observers.emit(&ViewEvent::FormOpened {
            mode,
            form: form.clone(),
        });
        Ok(form)
    }

    pub fn open_add_form(&self) -> Result<EntryForm, AppError> {
        self.open_form(EditMode::Adding, EntryForm::default())
    }

    /// Prefill the form from the cached record and switch to update mode for it.
    pub fn begin_edit(&self, id: &BookId) -> Result<EntryForm, AppError> {
        let form = EntryForm::from_book(&self.book(id)?);
        self.open_form(EditMode::Editing(id.clone()), form)
    }

    pub fn cancel_form(&self) -> Result<(), AppError> {
        self.write()?.edit = EditMode::Closed;
        self.observers.emit(&ViewEvent::FormClosed);
        Ok(())
    }

    /// Submit the open form.
    ///
    /// A form that fails its presence checks stays open. Once the store has
    /// been called the form closes whether or not the call succeeded; the
    /// outcome is reported through the notifier and the returned result.
    pub fn submit(&self, form: &EntryForm) -> Result<SubmitOutcome, AppError> {
        let gateway = self.gateway()?;
        let mode = self.edit_mode()?;
        let fields = match mode {
            EditMode::Closed => return Err(AppError::FormNotOpen),
            _ => form.to_fields()?,
        };

        let result = match mode {
            EditMode::Editing(id) => gateway
                .update(&id, fields)
                .map(|()| SubmitOutcome::Updated(id)),
            _ => gateway.create(fields).map(SubmitOutcome::Created),
        };

        self.cancel_form()?;
        result.map_err(AppError::Store)
    }

    // --- delete & intents --------------------------------------------------

    pub fn request_delete(
        &self,
        id: &BookId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, AppError> {
        Ok(self.gateway()?.delete(id, confirm)?)
    }

    /// Route a card intent.
    pub fn dispatch(&self, intent: Intent, confirm: &dyn Confirm) -> Result<IntentOutcome, AppError> {
        match intent {
            Intent::OpenDetail(id) => self.open_detail(&id).map(IntentOutcome::Detail),
            Intent::Edit(id) => self.begin_edit(&id).map(IntentOutcome::Editing),
            Intent::Delete(id) => self
                .request_delete(&id, confirm)
                .map(IntentOutcome::Delete),
        }
    }
}
