use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use pricewatch_core::{PollingConfig, PriceService};
use pricewatch_market_data::{
    AssetDescriptor, AssetRegistry, AssetSnapshot, FetchOutcome, HistoryPoint, MarketDataError,
    PriceFetcher,
};
use pricewatch_server::{api::app_router, config::Config, AppState};
use tower::ServiceExt;

/// The router tests never start polling, so this is never called.
struct IdleFetcher;

#[async_trait]
impl PriceFetcher for IdleFetcher {
    fn id(&self) -> &'static str {
        "IDLE"
    }

    async fn fetch(&self, _asset: &AssetDescriptor) -> Result<FetchOutcome, MarketDataError> {
        Ok(FetchOutcome::Unsupported)
    }
}

fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        cors_allow: vec!["*".to_string()],
        request_timeout: Duration::from_secs(5),
        coingecko_url: "http://127.0.0.1:9".to_string(),
        coingecko_api_key: None,
        stale_after: Duration::from_secs(300),
    }
}

fn build_test_router() -> (Router, Arc<PriceService>) {
    let service = Arc::new(
        PriceService::new(
            AssetRegistry::tracked_assets(),
            Arc::new(IdleFetcher),
            PollingConfig::default(),
        )
        .unwrap(),
    );
    let config = test_config();
    let state = Arc::new(AppState {
        price_service: service.clone(),
        stale_after: config.stale_after,
    });
    (app_router(state, &config), service)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, headers, json)
}

fn sample_snapshot() -> AssetSnapshot {
    AssetSnapshot {
        current_price: 64250.5,
        change_24h_percent: -1.25,
        history: vec![
            HistoryPoint::new(1_700_000_000_000, 63000.0),
            HistoryPoint::new(1_700_003_600_000, 64250.5),
        ],
    }
}

#[tokio::test]
async fn unknown_asset_is_not_found() {
    let (app, _service) = build_test_router();
    let (status, _, body) = get(&app, "/api/price?id=dogecoin").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "Asset not found");
}

#[tokio::test]
async fn tracked_asset_without_data_is_unavailable() {
    let (app, _service) = build_test_router();
    let (status, headers, body) = get(&app, "/api/price?id=bitcoin").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Data initializing, please try again shortly");
    assert_eq!(headers.get(header::RETRY_AFTER).unwrap(), "5");
}

#[tokio::test]
async fn cached_snapshot_is_served() {
    let (app, service) = build_test_router();
    service.cache().put("bitcoin", sample_snapshot());

    let (status, _, body) = get(&app, "/api/price?id=bitcoin").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPrice"], 64250.5);
    assert_eq!(body["change24h"], -1.25);
    assert_eq!(body["history"][0]["timestamp"], 1_700_000_000_000i64);
    assert_eq!(body["history"][1]["value"], 64250.5);
    assert_eq!(body["stale"], false);
    assert!(body["fetchedAt"].is_string());
}

#[tokio::test]
async fn stale_snapshot_is_still_served() {
    let (app, service) = build_test_router();
    let old = Utc::now() - chrono::Duration::minutes(30);
    service.cache().put_at("gold", sample_snapshot(), old);

    let (status, _, body) = get(&app, "/api/price?id=gold").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stale"], true);
    assert_eq!(body["currentPrice"], 64250.5);
}

#[tokio::test]
async fn missing_id_is_bad_request() {
    let (app, _service) = build_test_router();

    let (status, _, body) = get(&app, "/api/price").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);

    let (status, _, _) = get(&app, "/api/price?id=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assets_are_listed_in_registry_order() {
    let (app, _service) = build_test_router();
    let (status, _, body) = get(&app, "/api/assets").await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["bitcoin", "ethereum", "gold"]);
    assert_eq!(body[2]["symbol"], "XAU");
    assert_eq!(body[2]["type"], "commodity");
}

#[tokio::test]
async fn health_and_status_endpoints() {
    let (app, _service) = build_test_router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"ok");

    let (status, _, body) = get(&app, "/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["polling"], false);
    assert_eq!(body["trackedAssets"], 3);
}
