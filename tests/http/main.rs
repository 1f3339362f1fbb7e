//! HTTP surface tests, driven through the router with `tower::ServiceExt::oneshot`.

#![cfg(feature = "http")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bookshelf::{
    http, sample_books, BookFields, Bookshelf, InMemoryRecordStore, NotificationLog,
    PreferenceFile, RecordStore,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

struct TestApp {
    app: Router,
    store: InMemoryRecordStore,
    log: NotificationLog,
    _dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let store = InMemoryRecordStore::new();
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));
    shelf.attach(Arc::new(store.clone())).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let preferences = PreferenceFile::new(dir.path().join("preferences.json"));
    TestApp {
        app: http::router(Arc::new(shelf), preferences),
        store,
        log,
        _dir: dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn health_reports_connection() {
    let t = test_app();
    let (status, body) = send(&t.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "connected": true, "books": 0 }));
}

#[tokio::test]
async fn list_filters_and_orders() {
    let t = test_app();
    for fields in sample_books() {
        t.store.insert(fields).unwrap();
    }
    t.store
        .insert(
            BookFields::new("Piranesi", "Susanna Clarke")
                .with_month("2025-02")
                .with_rating(3.5),
        )
        .unwrap();

    let (status, body) = send(&t.app, get("/books")).await;
    assert_eq!(status, StatusCode::OK);
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0]["title"], "Piranesi");
    assert_eq!(cards[0]["star_glyphs"], "★★★½");
    assert_eq!(cards[0]["cover"]["kind"], "placeholder");
    assert_eq!(
        body["months"],
        json!([
            { "value": "2025-02", "label": "February 2025" },
            { "value": "2025-01", "label": "January 2025" },
        ])
    );

    let (_, body) = send(&t.app, get("/books?q=chemistry&status=finished")).await;
    let cards = body["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["title"], "Lessons in Chemistry");

    let (_, body) = send(&t.app, get("/books?q=nothing")).await;
    assert_eq!(body["cards"], json!([]));
    assert_eq!(body["empty_message"], "No books match \"nothing\".");
}

#[tokio::test]
async fn create_update_and_fetch() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        with_json(
            "POST",
            "/books",
            json!({ "title": "Dune", "author": "Frank Herbert", "rating": "4", "status": "reading" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(t.log.latest().unwrap().message, "Book added successfully!");

    let (status, _) = send(
        &t.app,
        with_json(
            "PUT",
            &format!("/books/{id}"),
            json!({ "title": "Dune", "author": "Frank Herbert", "rating": "5", "status": "finished", "genre": "Sci-Fi" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, card) = send(&t.app, get(&format!("/books/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card["status"], "Finished");
    assert_eq!(card["genre"], "Sci-Fi");
    assert_eq!(card["rating_text"], "(5/5)");
    assert_eq!(t.store.snapshot().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_entries_are_rejected() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        with_json("POST", "/books", json!({ "title": "   ", "author": "Someone" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("title"));
    assert!(t.store.snapshot().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_books_are_not_found() {
    let t = test_app();
    let (status, _) = send(&t.app, get("/books/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &t.app,
        with_json("PUT", "/books/missing", json!({ "title": "T", "author": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let t = test_app();
    let id = t.store.insert(BookFields::new("Dune", "Frank Herbert")).unwrap();

    let (status, body) = send(&t.app, empty("DELETE", &format!("/books/{id}"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], bookshelf::DELETE_PROMPT);
    assert_eq!(t.store.snapshot().unwrap().len(), 1);

    let (status, _) = send(
        &t.app,
        empty("DELETE", &format!("/books/{id}?confirm=true")),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(t.store.snapshot().unwrap().is_empty());
}

#[tokio::test]
async fn store_outage_maps_to_service_unavailable() {
    let t = test_app();
    t.store.set_available(false);
    let (status, _) = send(
        &t.app,
        with_json("POST", "/books", json!({ "title": "Dune", "author": "Frank Herbert" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        t.log.latest().unwrap().message,
        "Error adding book. Please try again."
    );
}

#[tokio::test]
async fn theme_toggles_and_persists() {
    let t = test_app();
    let (_, body) = send(&t.app, get("/preferences/theme")).await;
    assert_eq!(body, json!({ "theme": "light" }));

    let (status, body) = send(&t.app, empty("POST", "/preferences/theme/toggle")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "theme": "dark" }));

    let (_, body) = send(&t.app, get("/preferences/theme")).await;
    assert_eq!(body, json!({ "theme": "dark" }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_posts_to_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.json");
    let log = NotificationLog::new();
    let mut shelf = Bookshelf::new(Arc::new(log.clone()));
    shelf
        .attach(Arc::new(bookshelf::FileRecordStore::open(&path).unwrap()))
        .unwrap();
    let app = http::router(
        Arc::new(shelf),
        PreferenceFile::new(dir.path().join("preferences.json")),
    );

    let requests: Vec<_> = (0..32)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                let request = with_json(
                    "POST",
                    "/books",
                    json!({ "title": format!("Book {i}"), "author": "A" }),
                );
                send(&app, request).await.0
            })
        })
        .collect();
    for request in requests {
        assert_eq!(request.await.unwrap(), StatusCode::CREATED);
    }

    let (_, body) = send(&app, get("/health")).await;
    assert_eq!(body["books"], 32);
    assert_eq!(log.len(), 32);
    assert_eq!(
        bookshelf::FileRecordStore::open(&path)
            .unwrap()
            .snapshot()
            .unwrap()
            .len(),
        32
    );
}
