//! Persisted state layout and sanitizing deserialization.
//!
//! The durable representation is a single JSON document:
//!
//! ```json
//! {
//!   "users":  { "<chat id>": { "token": "...", "texts": { ... },
//!                              "subscriptionExpiresAt": "...", "updatedAt": "..." } },
//!   "tokens": { "<token>": "<chat id>" }
//! }
//! ```
//!
//! `tokens` is a derived index over `users`. On load it is rebuilt from the
//! sanitized user records; raw entries survive only for known users whose
//! token is not already indexed, so the per-user mapping stays authoritative.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Placeholder texts shown until the owner publishes their own.
pub const DEFAULT_TITLE: &str = "Ваш заголовок появится здесь";
pub const DEFAULT_SUBTITLE: &str = "Обновите текст через Telegram-бота";
pub const DEFAULT_BODY: &str = "После оплаты подписки вы сможете задать свои тексты командой /set_texts.";

/// The three owner-published text fields shown in the mobile app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Texts {
    pub title: String,
    pub subtitle: String,
    pub body: String,
}

impl Default for Texts {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
        }
    }
}

/// A single bot user: opaque API token, published texts, subscription window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub token: String,
    pub texts: Texts,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserRecord {
    /// Fresh user: random token, default texts, no subscription.
    pub fn new() -> Self {
        Self {
            token: Uuid::new_v4().to_string(),
            texts: Texts::default(),
            subscription_expires_at: None,
            updated_at: None,
        }
    }
}

impl Default for UserRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory image of the persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreData {
    pub users: HashMap<String, UserRecord>,
    pub tokens: HashMap<String, String>,
}

impl StoreData {
    /// Rebuilds the token index from the users map alone.
    pub fn derived_token_index(&self) -> HashMap<String, String> {
        self.users
            .iter()
            .filter(|(_, user)| !user.token.is_empty())
            .map(|(id, user)| (user.token.clone(), id.clone()))
            .collect()
    }
}

/// Raw on-disk document. User records are kept as loose JSON values so a
/// single malformed record cannot fail the whole load.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawState {
    #[serde(default)]
    pub users: HashMap<String, Value>,
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

impl RawState {
    /// Sanitizes raw records into a consistent [`StoreData`].
    ///
    /// Non-object user records are dropped. Partial records are repaired:
    /// empty/absent tokens regenerated, texts merged over defaults,
    /// unparseable timestamps nulled. The token index is rebuilt from the
    /// sanitized users; raw entries are applied additively afterwards and
    /// only when they point at a known user.
    pub fn normalize(self) -> StoreData {
        let mut data = StoreData::default();

        for (identity, raw_user) in self.users {
            let Some(user) = sanitize_user(&raw_user) else {
                log::warn!("Dropping malformed user record for identity {identity}");
                continue;
            };
            data.tokens.insert(user.token.clone(), identity.clone());
            data.users.insert(identity, user);
        }

        for (token, identity) in self.tokens {
            if !data.tokens.contains_key(&token) && data.users.contains_key(&identity) {
                data.tokens.insert(token, identity);
            }
        }

        data
    }
}

/// Repairs one raw user record, or rejects it when it is not even an object.
fn sanitize_user(raw: &Value) -> Option<UserRecord> {
    let obj = raw.as_object()?;

    let token = obj
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    Some(UserRecord {
        token,
        texts: sanitize_texts(obj.get("texts")),
        subscription_expires_at: parse_instant(obj.get("subscriptionExpiresAt")),
        updated_at: parse_instant(obj.get("updatedAt")),
    })
}

/// Merges raw texts over the placeholder defaults, field by field.
fn sanitize_texts(raw: Option<&Value>) -> Texts {
    let mut texts = Texts::default();
    let Some(obj) = raw.and_then(Value::as_object) else {
        return texts;
    };

    if let Some(title) = obj.get("title").and_then(Value::as_str) {
        texts.title = title.to_string();
    }
    if let Some(subtitle) = obj.get("subtitle").and_then(Value::as_str) {
        texts.subtitle = subtitle.to_string();
    }
    if let Some(body) = obj.get("body").and_then(Value::as_str) {
        texts.body = body.to_string();
    }
    texts
}

/// RFC 3339 timestamp or nothing. Anything unparseable is nulled.
fn parse_instant(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    raw?.as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}
