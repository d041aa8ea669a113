use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use tekstbot::core::{config, web_server};
use tekstbot::storage::TextStore;
use tekstbot::telegram::{create_bot, resolve_bot_link, schema, setup_bot_commands, HandlerDeps};

/// Main entry point for the bot and the web API
///
/// # Errors
/// Returns an error if initialization fails (store load, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    pretty_env_logger::init();

    // The store must be loaded before anything can serve or mutate it.
    // An unreadable or syntactically broken state file is fatal here.
    let store = Arc::new(TextStore::load(config::TEXTS_FILE.as_str()).await?);
    log::info!(
        "Loaded store from {} ({} users)",
        config::TEXTS_FILE.as_str(),
        store.user_count()
    );

    let bot = create_bot()?;
    let bot_link = resolve_bot_link(&bot).await;
    match bot_link.as_deref() {
        Some(link) => log::info!("Bot link: {}", link),
        None => log::warn!("Bot link unavailable; API error responses will omit it"),
    }

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    // Web server runs alongside the bot dispatcher.
    let web_store = Arc::clone(&store);
    let web_link = bot_link.clone();
    let port = *config::PORT;
    tokio::spawn(async move {
        if let Err(e) = web_server::start_web_server(port, web_store, web_link).await {
            log::error!("Web server exited: {}", e);
        }
    });

    let handler = schema(HandlerDeps::new(store, bot_link));

    log::info!("Starting bot in long polling mode");
    Dispatcher::builder(bot, handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
