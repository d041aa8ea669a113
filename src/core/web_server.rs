//! Public-facing web server for the mobile app.
//!
//! Serves the owner-published texts at /texts behind a bearer token, and a
//! /health probe with the current user count. Runs on PORT alongside the
//! bot dispatcher.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::core::access::{resolve_access, AccessResult};
use crate::core::error::AppResult;
use crate::storage::TextStore;

/// Shared state for the web server.
#[derive(Clone)]
struct WebState {
    store: Arc<TextStore>,
    bot_link: Option<String>,
}

/// Builds the API router. Split out of [`start_web_server`] so tests can
/// drive the same routes on an ephemeral port.
pub fn app(store: Arc<TextStore>, bot_link: Option<String>) -> Router {
    let state = WebState { store, bot_link };

    Router::new()
        .route("/texts", get(texts_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the public web server.
pub async fn start_web_server(port: u16, store: Arc<TextStore>, bot_link: Option<String>) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /texts   - Published texts (token-gated)");
    log::info!("  /health  - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app(store, bot_link)).await?;

    Ok(())
}

/// Extracts the access token from the request.
///
/// An `Authorization: Bearer <token>` header with content takes priority
/// over the `token` query parameter.
fn extract_token<'a>(headers: &'a HeaderMap, query: &'a HashMap<String, String>) -> Option<&'a str> {
    let header_token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    header_token.or_else(|| query.get("token").map(String::as_str))
}

/// GET /texts — resolves the bearer token to content or an error state.
async fn texts_handler(
    State(state): State<WebState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let token = extract_token(&headers, &query);
    let bot_link = state.bot_link.as_deref();

    match resolve_access(&state.store, token, Utc::now()) {
        AccessResult::BadRequest => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Token is required",
                "bot_link": bot_link,
            })),
        )
            .into_response(),
        AccessResult::InvalidToken => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "Invalid token. Request a new one in the Telegram bot.",
                "bot_link": bot_link,
            })),
        )
            .into_response(),
        AccessResult::SubscriptionInactive { expires_at } => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "Subscription is not active.",
                "bot_link": bot_link,
                "subscription": {
                    "active": false,
                    "expires_at": expires_at,
                },
            })),
        )
            .into_response(),
        AccessResult::Content {
            texts,
            updated_at,
            expires_at,
        } => Json(json!({
            "data": texts,
            "last_updated": updated_at,
            "subscription": {
                "active": true,
                "expires_at": expires_at,
            },
        }))
        .into_response(),
    }
}

/// GET /health — process liveness plus the current user count.
async fn health_handler(State(state): State<WebState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "users": state.store.user_count(),
        "bot_link": state.bot_link,
    }))
}
