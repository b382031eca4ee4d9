// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with every
// upstream pointed at an unroutable address so each fetcher resolves to its
// demo payload deterministically.
//
// Covered:
// - GET /health
// - GET /api/data          (full aggregate, 5 sources, all demo)
// - GET /api/briefing      (template path, demo_mode)
// - GET /api/widget/{kind} (single widget + unknown kind)

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use command_center::aggregator::{shared_client, Aggregator};
use command_center::api::{self, AppState};
use command_center::briefing::BriefingGenerator;
use command_center::sources::{
    market::MarketFetcher, news::NewsFetcher, quote::QuoteFetcher, trending::TrendingFetcher,
    weather::WeatherFetcher, SourceFetcher,
};

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

// Nothing listens on port 9; every request fails fast with a connect error.
const DEAD: &str = "http://127.0.0.1:9";

fn offline_aggregator() -> Aggregator {
    let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(WeatherFetcher::new(None).with_bases(DEAD, DEAD)),
        Arc::new(NewsFetcher::new(None).with_bases(DEAD, DEAD)),
        Arc::new(MarketFetcher::new(None).with_bases(DEAD, DEAD)),
        Arc::new(TrendingFetcher::new().with_base(DEAD)),
        Arc::new(QuoteFetcher::new().with_base(DEAD)),
    ];
    Aggregator::from_parts(shared_client(), fetchers, Duration::ZERO)
}

/// Build the same Router the binary uses, with offline components.
fn test_router() -> Router {
    let state = AppState::from_parts(offline_aggregator(), BriefingGenerator::without_ai());
    api::router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse json body");
    (status, v)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "ok", "health body should be 'ok'");
}

#[tokio::test]
async fn api_data_returns_all_five_sources() {
    let (status, v) = get_json(test_router(), "/api/data").await;
    assert_eq!(status, StatusCode::OK);

    let data = v.get("data").expect("missing 'data'");
    assert!(v.get("timestamp").is_some(), "missing 'timestamp'");

    let map = data.as_object().expect("data must be an object");
    assert_eq!(map.len(), 5, "one entry per source");
    for key in ["weather", "news", "market", "trending", "quote"] {
        let entry = map.get(key).unwrap_or_else(|| panic!("missing '{key}'"));
        assert_eq!(entry["source"], key, "entry keyed by its own source tag");
        assert_eq!(entry["demo"], true, "offline run must be demo data");
        assert!(entry.get("data").is_some(), "demo entry still carries data");
    }
}

#[tokio::test]
async fn api_briefing_renders_template_in_demo_mode() {
    let (status, v) = get_json(test_router(), "/api/briefing").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["ai_powered"], false);
    assert_eq!(v["demo_mode"], true);
    assert!(v.get("generated_at").is_some(), "missing 'generated_at'");

    let text = v["text"].as_str().expect("'text' must be a string");
    assert!(text.contains("Good morning"), "briefing keeps its greeting");
}

#[tokio::test]
async fn api_widget_quote_returns_single_demo_result() {
    let (status, v) = get_json(test_router(), "/api/widget/quote").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["source"], "quote");
    assert_eq!(v["demo"], true);
    assert!(
        v["data"]["text"].as_str().is_some_and(|t| !t.is_empty()),
        "quote widget must carry a non-empty text"
    );
}

#[tokio::test]
async fn api_widget_unknown_kind_is_404() {
    let (status, v) = get_json(test_router(), "/api/widget/horoscope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(v["error"], "unknown widget type");
}
