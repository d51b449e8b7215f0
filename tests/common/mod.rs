// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower::ServiceExt;

use tychem_api::{
    config::AppConfig,
    events::{Event, EventSender},
    handlers,
    models::{fallback_catalog, Product},
    services::catalog::CatalogService,
    services::notifications::{NotificationRelay, RelayConfig},
    services::sitemap::SitemapPublisher,
    store::{CatalogStore, FileStore, MemoryStore},
    AppState,
};

/// Helper harness composing the full router over an in-memory store.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    /// Keeps the event channel open so mutations can emit.
    #[allow(dead_code)]
    pub events: mpsc::Receiver<Event>,
    /// Holds the sitemap directory alive for the test's duration.
    pub tempdir: TempDir,
}

impl TestApp {
    /// Empty in-memory catalog, relay with nothing configured.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), None)
    }

    /// In-memory catalog pre-loaded with the ten default products.
    pub fn seeded() -> Self {
        Self::with_store(Arc::new(MemoryStore::with_seed(fallback_catalog())), None)
    }

    /// Store whose backing file is corrupt, so every read fails.
    pub fn unreachable() -> Self {
        let tempdir = TempDir::new().unwrap();
        let path = tempdir.path().join("products.json");
        std::fs::write(&path, "{ corrupt").unwrap();
        let mut app = Self::with_store(Arc::new(FileStore::new(path)), None);
        app.tempdir = tempdir;
        app
    }

    pub fn with_relay(relay_config: RelayConfig) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), Some(relay_config))
    }

    fn with_store(store: Arc<dyn CatalogStore>, relay_config: Option<RelayConfig>) -> Self {
        let tempdir = TempDir::new().unwrap();

        let mut config = AppConfig::new("https://tychem.net", "127.0.0.1", 0, "test");
        config.sitemap_path = tempdir
            .path()
            .join("sitemap.xml")
            .to_string_lossy()
            .into_owned();

        let (event_tx, events) = mpsc::channel(64);
        let catalog = Arc::new(CatalogService::new(store, EventSender::new(event_tx)));
        let publisher = Arc::new(SitemapPublisher::new(&config.sitemap_path));
        let relay = Arc::new(NotificationRelay::new(relay_config.unwrap_or(
            RelayConfig {
                indexnow_endpoint: "http://127.0.0.1:1/indexnow".to_string(),
                indexnow_host: None,
                indexnow_key: None,
                ping_endpoints: Vec::new(),
            },
        )));

        let state = AppState {
            config,
            catalog,
            publisher,
            relay,
        };

        let router = handlers::routes().with_state(state.clone());

        Self {
            router,
            state,
            events,
            tempdir,
        }
    }

    pub async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method("POST")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method("PUT")
                .uri(path)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method("DELETE")
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Raw (non-JSON) GET, for the sitemap document.
    pub async fn get_raw(&self, path: &str) -> (StatusCode, String, String) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(path)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .map(|v| v.to_str().unwrap_or_default().to_string())
            .unwrap_or_default();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[allow(dead_code)]
pub fn products_from(body: &Value) -> Vec<Product> {
    serde_json::from_value(body["products"].clone()).unwrap()
}
