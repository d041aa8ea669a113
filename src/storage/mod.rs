//! Persisted state: data layout, sanitizing load, file-backed store service

pub mod state;
pub mod store;

// Re-exports for convenience
pub use state::{StoreData, Texts, UserRecord, DEFAULT_BODY, DEFAULT_SUBTITLE, DEFAULT_TITLE};
pub use store::TextStore;
