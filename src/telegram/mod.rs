//! Telegram bot integration and command handlers

pub mod bot;
pub mod commands;
pub mod schema;
pub mod types;

/// The concrete bot type used throughout the handlers.
pub type Bot = teloxide::Bot;

pub use bot::{create_bot, resolve_bot_link, setup_bot_commands, Command};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
