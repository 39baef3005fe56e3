#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use mangaledger_api::config::ServerConfig;
use mangaledger_api::router::build_app_router;
use mangaledger_api::state::AppState;
use mangaledger_content::{ContentFetcher, GatewayConfig, MemorySource, DEFAULT_CACHE_CAPACITY};
use mangaledger_core::address::ContentAddress;
use mangaledger_core::anchor::AnchorEvent;
use mangaledger_history::{EventLog, EventLogConfig, HistoryWalker, WalkOptions};

pub const GATEWAY: &str = "https://gw.example/ipfs/";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        gateway: GatewayConfig {
            base_url: GATEWAY.to_string(),
            ..Default::default()
        },
        content_cache: false,
        content_cache_capacity: DEFAULT_CACHE_CAPACITY,
        event_log: EventLogConfig::default(),
        walk: WalkOptions::default(),
    }
}

/// Build the full application router over in-memory stores.
///
/// Uses the same [`build_app_router`] as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app(source: MemorySource, event_log: impl EventLog + 'static) -> Router {
    let config = test_config();
    let fetcher = ContentFetcher::new(Arc::new(source), GATEWAY);
    let walker = HistoryWalker::with_options(fetcher, Arc::new(event_log), config.walk.clone());

    let state = AppState {
        config: Arc::new(config.clone()),
        walker,
    };

    build_app_router(state, &config)
}

/// Send a `GET` request through the router.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn addr(raw: &str) -> ContentAddress {
    ContentAddress::parse(raw).unwrap()
}

pub fn cid(version: u64) -> String {
    format!("QmVersion{version}")
}

pub fn record(version: u64, previous: &str) -> Value {
    json!({
        "version": version,
        "type": "UPDATE_CHAPTER",
        "changeLog": {
            "timestamp": "2024-06-01T08:30:00.000Z",
            "description": format!("Revision {version}"),
            "changes": [{ "field": "title", "oldValue": "a", "newValue": "b" }]
        },
        "recentVersions": [],
        "previousVersion": previous
    })
}

/// A well-formed chain `0 <- 1 <- ... <- len-1`.
pub fn linear_chain(len: u64) -> MemorySource {
    (0..len).fold(MemorySource::new(), |source, version| {
        let previous = if version == 0 { String::new() } else { cid(version - 1) };
        source.with_entry(addr(&cid(version)), record(version, &previous))
    })
}

pub fn anchor(entity_id: i64, block_number: u64, address: &str) -> AnchorEvent {
    AnchorEvent {
        entity_id,
        content_address: addr(address),
        timestamp: "2024-06-01T08:30:00Z".parse().unwrap(),
        block_number,
        log_index: 0,
    }
}
