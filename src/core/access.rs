//! Access decisions for the mobile API.
//!
//! Maps a bearer token to one of four outcomes. This is a pure read over
//! the current store contents plus the evaluation time — all mutation
//! happens through the bot command adapter.

use chrono::{DateTime, Utc};

use crate::core::subscription;
use crate::storage::{TextStore, Texts};

/// Outcome of a token lookup, matched exhaustively by the HTTP layer.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessResult {
    /// Token missing from the request, or blank after trimming.
    BadRequest,
    /// Token does not resolve to a known user.
    InvalidToken,
    /// Token resolved, but the subscription window is not open.
    SubscriptionInactive { expires_at: Option<DateTime<Utc>> },
    /// Token resolved and the subscription is active.
    Content {
        texts: Texts,
        updated_at: Option<DateTime<Utc>>,
        expires_at: DateTime<Utc>,
    },
}

/// Resolves a bearer token to an access outcome at time `now`.
pub fn resolve_access(store: &TextStore, token: Option<&str>, now: DateTime<Utc>) -> AccessResult {
    let token = token.map(str::trim).unwrap_or_default();
    if token.is_empty() {
        return AccessResult::BadRequest;
    }

    let Some((_identity, user)) = store.find_by_token(token) else {
        return AccessResult::InvalidToken;
    };

    match user.subscription_expires_at {
        Some(expires_at) if subscription::is_active(Some(expires_at), now) => AccessResult::Content {
            texts: user.texts,
            updated_at: user.updated_at,
            expires_at,
        },
        expires_at => AccessResult::SubscriptionInactive { expires_at },
    }
}
