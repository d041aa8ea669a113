//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::bot::Command;
use super::commands::{
    handle_activate_command, handle_help_command, handle_my_token_command, handle_set_field_command,
    handle_set_texts_command, handle_start_command, handle_status_command, handle_subscribe_command,
    handle_successful_payment, TextField,
};
use super::types::{HandlerDeps, HandlerError};
use crate::core::config;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. The same schema is used in production and in tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_payment = deps.clone();
    let deps_activate = deps.clone();
    let deps_commands = deps.clone();

    dptree::entry()
        // Successful payment handler must be first
        .branch(successful_payment_handler(deps_payment))
        // Hidden secret-gated /activate command (not in Command enum)
        .branch(activate_handler(deps_activate))
        // Command handler
        .branch(command_handler(deps_commands))
        // Pre-checkout query handler
        .branch(pre_checkout_handler())
}

/// Handler for successful Telegram payments
fn successful_payment_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.successful_payment().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                log::info!("Received successful_payment message from chat {}", msg.chat.id);
                if let Err(e) = handle_successful_payment(&bot, &msg, &deps).await {
                    log::error!("Failed to handle successful payment for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for the /activate command (hidden, enabled only when the
/// activation secret is configured)
fn activate_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            !config::SUBSCRIPTION_ACTIVATION_SECRET.is_empty()
                && msg
                    .text()
                    .map(|text| text == "/activate" || text.starts_with("/activate "))
                    .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let args = msg
                    .text()
                    .and_then(|text| text.strip_prefix("/activate"))
                    .unwrap_or_default()
                    .trim();

                if let Err(e) = handle_activate_command(&bot, &msg, &deps, args).await {
                    log::error!("/activate handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}

/// Handler for bot commands (/start, /status, /set_texts, etc.)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);

                match cmd {
                    Command::Start => handle_start_command(&bot, &msg, &deps).await?,
                    Command::Help => handle_help_command(&bot, &msg, &deps).await?,
                    Command::Status => handle_status_command(&bot, &msg, &deps).await?,
                    Command::MyToken => handle_my_token_command(&bot, &msg, &deps).await?,
                    Command::Subscribe => handle_subscribe_command(&bot, &msg, &deps).await?,
                    Command::SetTexts(payload) => handle_set_texts_command(&bot, &msg, &deps, &payload).await?,
                    Command::SetTitle(value) => {
                        handle_set_field_command(&bot, &msg, &deps, TextField::Title, &value).await?
                    }
                    Command::SetSubtitle(value) => {
                        handle_set_field_command(&bot, &msg, &deps, TextField::Subtitle, &value).await?
                    }
                    Command::SetBody(value) => {
                        handle_set_field_command(&bot, &msg, &deps, TextField::Body, &value).await?
                    }
                }
                Ok(())
            }
        },
    ))
}

/// Handler for pre-checkout queries (Telegram payments)
///
/// Invoices are only ever issued by /subscribe, so every query is approved.
fn pre_checkout_handler() -> UpdateHandler<HandlerError> {
    Update::filter_pre_checkout_query().endpoint(|bot: Bot, query: teloxide::types::PreCheckoutQuery| async move {
        log::info!(
            "Received pre_checkout_query: id={}, payload={}",
            query.id,
            query.invoice_payload
        );
        if let Err(e) = bot.answer_pre_checkout_query(query.id, true).await {
            log::error!("Failed to answer pre_checkout_query: {:?}", e);
        }
        Ok(())
    })
}
