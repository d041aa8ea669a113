//! Handler types and dependencies

use std::sync::Arc;

use crate::storage::TextStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: Arc<TextStore>,
    pub bot_link: Option<String>,
}

impl HandlerDeps {
    pub fn new(store: Arc<TextStore>, bot_link: Option<String>) -> Self {
        Self { store, bot_link }
    }
}
