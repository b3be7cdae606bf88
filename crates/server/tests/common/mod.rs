//! Shared fixtures for the HTTP tests

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;
use xss_core::{IngestRecord, NewRecord, PayloadSettings, TriggerClock};
use xss_server::{build_router, AppState, CorsConfig, RecordStore, SqliteStore, StoreError};

pub const PUBLIC_URL: &str = "https://collector.test";

/// Sqlite store that counts every call made against it.
pub struct CountingStore {
    inner: SqliteStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn insert(&self, record: NewRecord) -> Result<IngestRecord, StoreError> {
        self.hit();
        self.inner.insert(record).await
    }

    async fn update_screenshot_by_url(
        &self,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        self.hit();
        self.inner.update_screenshot_by_url(url, screenshot).await
    }

    async fn update_screenshot_by_id(
        &self,
        id: i64,
        url: &str,
        screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        self.hit();
        self.inner.update_screenshot_by_id(id, url, screenshot).await
    }

    async fn list(&self) -> Result<Vec<IngestRecord>, StoreError> {
        self.hit();
        self.inner.list().await
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        self.hit();
        self.inner.delete_by_id(id).await
    }

    async fn delete_all(&self) -> Result<usize, StoreError> {
        self.hit();
        self.inner.delete_all().await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.hit();
        self.inner.ping().await
    }
}

/// Store whose every operation fails.
pub struct BrokenStore;

fn broken() -> StoreError {
    StoreError::Rejected {
        status: 503,
        message: "database unavailable".to_string(),
    }
}

#[async_trait]
impl RecordStore for BrokenStore {
    async fn insert(&self, _record: NewRecord) -> Result<IngestRecord, StoreError> {
        Err(broken())
    }

    async fn update_screenshot_by_url(
        &self,
        _url: &str,
        _screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        Err(broken())
    }

    async fn update_screenshot_by_id(
        &self,
        _id: i64,
        _url: &str,
        _screenshot: Option<&str>,
    ) -> Result<Vec<IngestRecord>, StoreError> {
        Err(broken())
    }

    async fn list(&self) -> Result<Vec<IngestRecord>, StoreError> {
        Err(broken())
    }

    async fn delete_by_id(&self, _id: i64) -> Result<bool, StoreError> {
        Err(broken())
    }

    async fn delete_all(&self) -> Result<usize, StoreError> {
        Err(broken())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(broken())
    }
}

pub fn app_with_cors(store: Arc<dyn RecordStore>, cors: CorsConfig) -> Router {
    let state = Arc::new(AppState::new(
        store,
        TriggerClock::default(),
        PayloadSettings::new(PUBLIC_URL, "https://cdn.test/html2canvas.js"),
    ));
    build_router(state, cors.layer().unwrap())
}

pub fn app(store: Arc<dyn RecordStore>) -> Router {
    app_with_cors(store, CorsConfig::default())
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn bare(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
