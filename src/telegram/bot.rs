//! Bot initialization utilities
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Bot deep-link resolution

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;
use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "приветствие, токен и список команд")]
    Start,
    #[command(description = "список команд")]
    Help,
    #[command(description = "проверить статус подписки")]
    Status,
    #[command(description = "получить токен для входа в приложение")]
    MyToken,
    #[command(description = "оплатить подписку на месяц")]
    Subscribe,
    #[command(description = "обновить тексты: Заголовок | Подзаголовок | Основной текст")]
    SetTexts(String),
    #[command(description = "обновить только заголовок")]
    SetTitle(String),
    #[command(description = "обновить подзаголовок")]
    SetSubtitle(String),
    #[command(description = "обновить основной текст")]
    SetBody(String),
}

/// Creates a Bot instance with the configured credential and network timeout
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing credential or HTTP client build failure
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.clone();
    if token.is_empty() {
        return Err(anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable not set"));
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(token, client))
}

/// Resolves the public bot deep link.
///
/// An explicit `TELEGRAM_BOT_LINK` override wins; otherwise the link is
/// derived from `get_me`. A failed `get_me` is not fatal — API responses
/// then simply omit the recovery link.
pub async fn resolve_bot_link(bot: &Bot) -> Option<String> {
    let override_link = config::BOT_LINK_OVERRIDE.clone();
    if !override_link.is_empty() {
        return Some(override_link);
    }

    match bot.get_me().await {
        Ok(me) => me.username.clone().map(|username| format!("https://t.me/{username}")),
        Err(e) => {
            log::error!("Failed to fetch bot info: {}", e);
            None
        }
    }
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
