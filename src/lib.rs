//! Tekstbot — Telegram bot + token-gated HTTP API for owner-published texts
//!
//! A bot owner publishes three short text fields (title, subtitle, body)
//! that a companion mobile app displays. Each Telegram user gets an opaque
//! access token and an optional paid subscription window; the app fetches
//! the texts over a small HTTP API gated by that token.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, subscription arithmetic, access
//!   decisions, and the HTTP API
//! - `storage`: the JSON-file-backed state store (users + token index)
//! - `telegram`: bot integration and command handlers

pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::access::{resolve_access, AccessResult};
pub use crate::core::{config, AppError, AppResult};
pub use crate::storage::{StoreData, TextStore, Texts, UserRecord};
