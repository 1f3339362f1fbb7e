//! HTTP transport - exposes the shelf's views and mutations as JSON.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health` - `{ "ok": true, "connected": bool, "books": n }`.
//! - `GET /books?q=&month=&status=` - rendered grid plus month options.
//! - `GET /books/:id` - one rendered card.
//! - `POST /books` - create from an entry form, `201 { "id": .. }`.
//! - `PUT /books/:id` - overwrite from an entry form.
//! - `DELETE /books/:id?confirm=true` - delete; `409` without confirmation.
//! - `GET /preferences/theme`, `POST /preferences/theme/toggle`.
//!
//! ## Example
//!
//! ```ignore
//! let app = bookshelf::http::router(Arc::new(shelf), PreferenceFile::new("preferences.json"));
//! bookshelf::http::serve(app, "127.0.0.1:3000", shutdown_signal()).await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::app::{AppError, Bookshelf};
use crate::book::{month_label, BookId};
use crate::error::StoreError;
use crate::filter::FilterState;
use crate::form::{EntryForm, FormError};
use crate::gateway::{DeleteOutcome, DELETE_PROMPT};
use crate::preference::{PreferenceError, PreferenceFile};
use crate::render::{BookCard, RenderedGrid};

#[derive(Clone)]
struct HttpState {
    shelf: Arc<Bookshelf>,
    preferences: Arc<PreferenceFile>,
}

/// Error surface of the handlers.
#[derive(Debug)]
pub enum ApiError {
    App(AppError),
    Preference(PreferenceError),
    DeleteNotConfirmed,
    /// A blocking store or file call did not finish.
    Task(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::App(AppError::NotConnected) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::App(AppError::FormNotOpen) => StatusCode::CONFLICT,
            ApiError::App(AppError::UnknownBook(_)) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::Form(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::App(AppError::Store(StoreError::NotFound(_))) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::Store(StoreError::Unavailable(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::App(_) | ApiError::Preference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::DeleteNotConfirmed => StatusCode::CONFLICT,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::App(e) => e.to_string(),
            ApiError::Preference(e) => e.to_string(),
            ApiError::DeleteNotConfirmed => DELETE_PROMPT.to_string(),
            ApiError::Task(e) => format!("request task failed: {}", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.message(), "request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::App(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::App(AppError::Store(err))
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        ApiError::App(AppError::Form(err))
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Run synchronous store and file work on the blocking pool.
async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Task(err.to_string()))?
}

/// Build an axum `Router` over the given shelf and preference file.
pub fn router(shelf: Arc<Bookshelf>, preferences: PreferenceFile) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/books", get(list_handler).post(create_handler))
        .route(
            "/books/:id",
            get(detail_handler).put(update_handler).delete(delete_handler),
        )
        .route("/preferences/theme", get(theme_handler))
        .route("/preferences/theme/toggle", post(toggle_theme_handler))
        .with_state(HttpState {
            shelf,
            preferences: Arc::new(preferences),
        })
}

/// Serve `app` at `addr` until `shutdown` resolves.
pub async fn serve<S>(app: Router, addr: &str, shutdown: S) -> Result<(), std::io::Error>
where
    S: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
}

/// `GET /health`
async fn health_handler(State(state): State<HttpState>) -> ApiResult<impl IntoResponse> {
    let connected = state.shelf.connection()?.is_connected();
    let books = state.shelf.cached_len()?;
    Ok(Json(json!({ "ok": true, "connected": connected, "books": books })))
}

#[derive(Debug, Default, Deserialize)]
struct BooksQuery {
    #[serde(default)]
    q: String,
    #[serde(default)]
    month: String,
    #[serde(default)]
    status: String,
}

impl From<BooksQuery> for FilterState {
    fn from(query: BooksQuery) -> Self {
        FilterState::new()
            .with_query(query.q)
            .with_month(query.month)
            .with_status(query.status)
    }
}

#[derive(Debug, Serialize)]
struct MonthOption {
    value: String,
    label: String,
}

#[derive(Debug, Serialize)]
struct BooksPage {
    #[serde(flatten)]
    grid: RenderedGrid,
    months: Vec<MonthOption>,
}

/// `GET /books`
async fn list_handler(
    State(state): State<HttpState>,
    Query(query): Query<BooksQuery>,
) -> ApiResult<Json<BooksPage>> {
    let grid = state.shelf.render_with(&FilterState::from(query))?;
    let months = state
        .shelf
        .month_options()?
        .into_iter()
        .map(|value| MonthOption {
            label: month_label(&value),
            value,
        })
        .collect();
    Ok(Json(BooksPage { grid, months }))
}

/// `GET /books/:id`
async fn detail_handler(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BookCard>> {
    let book = state.shelf.book(&BookId::from(id))?;
    Ok(Json(BookCard::from_book(&book)))
}

/// `POST /books`
async fn create_handler(
    State(state): State<HttpState>,
    Json(form): Json<EntryForm>,
) -> ApiResult<impl IntoResponse> {
    let id = blocking(move || {
        let fields = form.to_fields()?;
        Ok(state.shelf.gateway()?.create(fields)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `PUT /books/:id`
async fn update_handler(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Json(form): Json<EntryForm>,
) -> ApiResult<impl IntoResponse> {
    let id = BookId::from(id);
    let target = id.clone();
    blocking(move || {
        let fields = form.to_fields()?;
        Ok(state.shelf.gateway()?.update(&target, fields)?)
    })
    .await?;
    Ok(Json(json!({ "id": id })))
}

#[derive(Debug, Default, Deserialize)]
struct DeleteQuery {
    #[serde(default)]
    confirm: bool,
}

/// `DELETE /books/:id?confirm=true`
async fn delete_handler(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<StatusCode> {
    let id = BookId::from(id);
    let confirmed = query.confirm;
    let outcome = blocking(move || {
        Ok(state
            .shelf
            .request_delete(&id, &move |_: &str| confirmed)?)
    })
    .await?;
    match outcome {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
        DeleteOutcome::Declined => Err(ApiError::DeleteNotConfirmed),
    }
}

/// `GET /preferences/theme`
async fn theme_handler(State(state): State<HttpState>) -> ApiResult<impl IntoResponse> {
    let theme = blocking(move || state.preferences.theme().map_err(ApiError::Preference)).await?;
    Ok(Json(json!({ "theme": theme })))
}

/// `POST /preferences/theme/toggle`
async fn toggle_theme_handler(State(state): State<HttpState>) -> ApiResult<impl IntoResponse> {
    let theme = blocking(move || {
        state
            .preferences
            .toggle_theme()
            .map_err(ApiError::Preference)
    })
    .await?;
    Ok(Json(json!({ "theme": theme })))
}
