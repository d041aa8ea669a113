//! End-to-end tests for the HTTP API
//!
//! Drives the real axum router over a loopback listener, the way the
//! mobile app consumes it.
//!
//! Run with: cargo test --test api_test

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tekstbot::core::web_server;
use tekstbot::TextStore;
use tempfile::TempDir;
use tokio::net::TcpListener;

const BOT_LINK: &str = "https://t.me/tekstbot";

async fn fixture_store(dir: &TempDir, now: DateTime<Utc>) -> Arc<TextStore> {
    let path = dir.path().join("data.json");
    let fixture = json!({
        "users": {
            "100": {
                "token": "active-token",
                "texts": { "title": "T", "subtitle": "S", "body": "B" },
                "subscriptionExpiresAt": (now + Duration::days(1)).to_rfc3339(),
                "updatedAt": now.to_rfc3339(),
            },
            "200": { "token": "fresh-token" },
        },
    });
    std::fs::write(&path, fixture.to_string()).expect("failed to write fixture");
    Arc::new(TextStore::load(path).await.expect("failed to load store"))
}

async fn spawn_server(store: Arc<TextStore>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("failed to bind");
    let addr = listener.local_addr().expect("local_addr");
    let app = web_server::app(store, Some(BOT_LINK.to_string()));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            panic!("test server exited: {e}");
        }
    });
    format!("http://{addr}")
}

async fn get_json(url: &str, bearer: Option<&str>) -> (u16, Value) {
    let client = reqwest::Client::new();
    let mut request = client.get(url);
    if let Some(token) = bearer {
        request = request.header("Authorization", format!("Bearer {token}"));
    }
    let response = request.send().await.expect("request failed");
    let status = response.status().as_u16();
    let body = response.json::<Value>().await.expect("body should be JSON");
    (status, body)
}

#[tokio::test]
async fn test_health_reports_user_count_and_bot_link() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_server(fixture_store(&dir, Utc::now()).await).await;

    let (status, body) = get_json(&format!("{base}/health"), None).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "status": "ok", "users": 2, "bot_link": BOT_LINK }));
}

#[tokio::test]
async fn test_missing_token_is_400() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_server(fixture_store(&dir, Utc::now()).await).await;

    let (status, body) = get_json(&format!("{base}/texts"), None).await;
    assert_eq!(status, 400);
    assert_eq!(body, json!({ "error": "Token is required", "bot_link": BOT_LINK }));
}

#[tokio::test]
async fn test_blank_query_token_is_400() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_server(fixture_store(&dir, Utc::now()).await).await;

    let (status, _body) = get_json(&format!("{base}/texts?token=%20%20"), None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_unknown_token_is_401() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_server(fixture_store(&dir, Utc::now()).await).await;

    let (status, body) = get_json(&format!("{base}/texts?token=nope"), None).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "Invalid token. Request a new one in the Telegram bot.");
    assert_eq!(body["bot_link"], BOT_LINK);
}

#[tokio::test]
async fn test_inactive_subscription_is_403_with_null_expiry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_server(fixture_store(&dir, Utc::now()).await).await;

    let (status, body) = get_json(&format!("{base}/texts"), Some("fresh-token")).await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "Subscription is not active.");
    assert_eq!(body["subscription"]["active"], json!(false));
    assert_eq!(body["subscription"]["expires_at"], Value::Null);
}

#[tokio::test]
async fn test_active_subscription_returns_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let base = spawn_server(fixture_store(&dir, now).await).await;

    let (status, body) = get_json(&format!("{base}/texts"), Some("active-token")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["data"],
        json!({ "title": "T", "subtitle": "S", "body": "B" })
    );
    assert_eq!(body["subscription"]["active"], json!(true));

    // Timestamps come back as RFC 3339 strings carrying the stored instants.
    let expires_at: DateTime<Utc> = body["subscription"]["expires_at"]
        .as_str()
        .expect("expires_at should be a string")
        .parse()
        .expect("expires_at should parse");
    assert_eq!(expires_at, now + Duration::days(1));

    let last_updated: DateTime<Utc> = body["last_updated"]
        .as_str()
        .expect("last_updated should be a string")
        .parse()
        .expect("last_updated should parse");
    assert_eq!(last_updated, now);
}

#[tokio::test]
async fn test_authorization_header_wins_over_query_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_server(fixture_store(&dir, Utc::now()).await).await;

    let (status, _body) = get_json(&format!("{base}/texts?token=nope"), Some("active-token")).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_empty_bearer_falls_back_to_query_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = spawn_server(fixture_store(&dir, Utc::now()).await).await;

    let (status, _body) = get_json(&format!("{base}/texts?token=active-token"), Some("  ")).await;
    assert_eq!(status, 200);
}
