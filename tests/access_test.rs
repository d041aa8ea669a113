//! Integration tests for the access-decision service
//!
//! Run with: cargo test --test access_test

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use tekstbot::{resolve_access, AccessResult, TextStore};
use tempfile::TempDir;

/// Store with one active, one lapsed and one never-subscribed user.
async fn fixture_store(dir: &TempDir, now: DateTime<Utc>) -> TextStore {
    let path = dir.path().join("data.json");
    let fixture = json!({
        "users": {
            "100": {
                "token": "abc",
                "texts": { "title": "T", "subtitle": "S", "body": "B" },
                "subscriptionExpiresAt": (now + Duration::days(1)).to_rfc3339(),
                "updatedAt": now.to_rfc3339(),
            },
            "200": {
                "token": "lapsed-token",
                "subscriptionExpiresAt": (now - Duration::days(1)).to_rfc3339(),
            },
            "300": { "token": "fresh-token" },
        },
    });
    std::fs::write(&path, fixture.to_string()).expect("failed to write fixture");
    TextStore::load(path).await.expect("failed to load store")
}

#[tokio::test]
async fn test_missing_and_blank_tokens_are_bad_requests() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    assert_eq!(resolve_access(&store, None, now), AccessResult::BadRequest);
    assert_eq!(resolve_access(&store, Some(""), now), AccessResult::BadRequest);
    assert_eq!(resolve_access(&store, Some("   "), now), AccessResult::BadRequest);
}

#[tokio::test]
async fn test_unknown_token_is_invalid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    assert_eq!(
        resolve_access(&store, Some("unknown-token"), now),
        AccessResult::InvalidToken
    );
}

#[tokio::test]
async fn test_never_subscribed_is_inactive_with_null_expiry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    assert_eq!(
        resolve_access(&store, Some("fresh-token"), now),
        AccessResult::SubscriptionInactive { expires_at: None }
    );
}

#[tokio::test]
async fn test_lapsed_subscription_is_inactive_with_expiry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    assert_eq!(
        resolve_access(&store, Some("lapsed-token"), now),
        AccessResult::SubscriptionInactive {
            expires_at: Some(now - Duration::days(1)),
        }
    );
}

#[tokio::test]
async fn test_active_subscription_yields_content() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    match resolve_access(&store, Some("abc"), now) {
        AccessResult::Content {
            texts,
            updated_at,
            expires_at,
        } => {
            assert_eq!(texts.title, "T");
            assert_eq!(texts.subtitle, "S");
            assert_eq!(texts.body, "B");
            assert_eq!(updated_at, Some(now));
            assert_eq!(expires_at, now + Duration::days(1));
        }
        other => panic!("expected Content, got {other:?}"),
    }
}

#[tokio::test]
async fn test_token_is_trimmed_before_lookup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    assert!(matches!(
        resolve_access(&store, Some("  abc  "), now),
        AccessResult::Content { .. }
    ));
}

#[tokio::test]
async fn test_expiry_boundary_is_inactive() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    // Exactly at the expiry instant the subscription is already over.
    let at_expiry = now + Duration::days(1);
    assert_eq!(
        resolve_access(&store, Some("abc"), at_expiry),
        AccessResult::SubscriptionInactive {
            expires_at: Some(at_expiry),
        }
    );
}

#[tokio::test]
async fn test_resolve_access_does_not_mutate_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let now = Utc::now();
    let store = fixture_store(&dir, now).await;

    let before = store.snapshot();
    let _ = resolve_access(&store, Some("abc"), now);
    let _ = resolve_access(&store, Some("unknown"), now);
    let _ = resolve_access(&store, None, now);
    assert_eq!(store.snapshot(), before);
}
