//! Integration tests for the HTTP gateway client against an in-process
//! axum server.

use std::time::Duration;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use mangaledger_content::{ContentFetcher, ContentSource, FetchError, GatewayClient, GatewayConfig};
use mangaledger_core::address::ContentAddress;

/// Start a fake gateway on an ephemeral port and return its base URL.
async fn spawn_gateway() -> String {
    let app = Router::new()
        .route(
            "/ipfs/QmRecord",
            get(|| async {
                Json(json!({
                    "version": 0,
                    "type": "CREATE_MANGA",
                    "changeLog": {
                        "timestamp": "2024-01-01T00:00:00Z",
                        "description": "Created",
                        "changes": [{ "manga_title": "Moonlit", "manga_id": 1, "categories": [] }]
                    },
                    "recentVersions": [],
                    "previousVersion": ""
                }))
            }),
        )
        .route(
            "/ipfs/QmImages",
            get(|| async {
                Json(json!([
                    { "image": "QmPageTwo", "page": 2 },
                    { "image": "//cdn.example/one.png", "page": 1 }
                ]))
            }),
        )
        .route("/ipfs/QmGarbage", get(|| async { "not json at all" }))
        .route(
            "/ipfs/QmSlow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([]))
            }),
        )
        .route(
            "/ipfs/QmMissing",
            get(|| async { (StatusCode::NOT_FOUND, "no link named") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/ipfs/")
}

fn addr(raw: &str) -> ContentAddress {
    ContentAddress::parse(raw).unwrap()
}

fn config(base_url: String) -> GatewayConfig {
    GatewayConfig {
        base_url,
        timeout: Duration::from_millis(500),
    }
}

#[tokio::test]
async fn fetch_json_returns_payload() {
    let client = GatewayClient::new(&config(spawn_gateway().await)).unwrap();
    let payload = client.fetch_json(&addr("QmRecord")).await.unwrap();
    assert_eq!(payload["type"], "CREATE_MANGA");
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let client = GatewayClient::new(&config(spawn_gateway().await)).unwrap();
    let result = client.fetch_json(&addr("QmMissing")).await;
    assert_matches!(result, Err(FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn invalid_json_is_a_decode_error() {
    let client = GatewayClient::new(&config(spawn_gateway().await)).unwrap();
    let result = client.fetch_json(&addr("QmGarbage")).await;
    assert_matches!(result, Err(FetchError::Decode(_)));
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let client = GatewayClient::new(&config(spawn_gateway().await)).unwrap();
    let result = client.fetch_json(&addr("QmSlow")).await;
    assert_matches!(result, Err(FetchError::Request(ref e)) if e.is_timeout());
}

#[tokio::test]
async fn fetcher_over_gateway_parses_records_and_images() {
    let base_url = spawn_gateway().await;
    let fetcher = ContentFetcher::from_gateway(&config(base_url.clone())).unwrap();

    let record = fetcher.fetch_record_str("QmRecord").await.unwrap();
    assert!(record.is_root());

    let images = fetcher.fetch_images_str("QmImages").await;
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].url, "https://cdn.example/one.png");
    assert_eq!(images[1].url, format!("{base_url}QmPageTwo"));

    assert!(fetcher.fetch_record_str("QmMissing").await.is_none());
    assert!(fetcher.fetch_images_str("QmGarbage").await.is_empty());
}
