use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Configuration constants for the bot and the web API
///
/// Everything is read once from the environment on first access. `.env` is
/// loaded in `main` before any of these are touched.

/// Telegram bot credential. Required — startup fails when missing.
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default());

/// Optional override for the public bot deep link.
/// When empty, the link is resolved from `get_me` as `https://t.me/<username>`.
pub static BOT_LINK_OVERRIDE: Lazy<String> = Lazy::new(|| env::var("TELEGRAM_BOT_LINK").unwrap_or_default());

/// Path to the persisted state file.
pub static TEXTS_FILE: Lazy<String> = Lazy::new(|| env::var("TEXTS_FILE").unwrap_or_else(|_| "data.json".to_string()));

/// Telegram payments provider credential.
/// When empty, /subscribe sends a placeholder message instead of an invoice.
pub static PAYMENT_PROVIDER_TOKEN: Lazy<String> =
    Lazy::new(|| env::var("PAYMENT_PROVIDER_TOKEN").unwrap_or_default());

/// Secret for the hidden /activate command.
/// When empty, the command is disabled entirely.
pub static SUBSCRIPTION_ACTIVATION_SECRET: Lazy<String> =
    Lazy::new(|| env::var("SUBSCRIPTION_ACTIVATION_SECRET").unwrap_or_default());

/// HTTP port for the web API.
pub static PORT: Lazy<u16> = Lazy::new(|| {
    env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
});

/// Subscription pricing and duration
pub mod subscription {
    use super::{env, Lazy};

    /// Invoice price in minor units of [`CURRENCY`]
    pub static PRICE: Lazy<u32> = Lazy::new(|| {
        env::var("SUBSCRIPTION_PRICE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(19900)
    });

    /// Invoice currency code
    pub static CURRENCY: Lazy<String> =
        Lazy::new(|| env::var("SUBSCRIPTION_CURRENCY").unwrap_or_else(|_| "RUB".to_string()));

    /// Days granted per paid (or manually activated) period
    pub static DURATION_DAYS: Lazy<i64> = Lazy::new(|| {
        env::var("SUBSCRIPTION_DURATION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|days| *days > 0)
            .unwrap_or(30)
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
