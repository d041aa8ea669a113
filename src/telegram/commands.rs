//! Command handler implementations
//!
//! The bot is the only mutation surface: every handler goes through the
//! store's registry/subscription methods and the store persists itself
//! before the user gets a confirmation.

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::{LabeledPrice, Message};

use super::types::{HandlerDeps, HandlerError};
use crate::core::{config, subscription};
use crate::storage::{Texts, UserRecord};
use crate::telegram::Bot;

/// Single text field targeted by /set_title, /set_subtitle, /set_body.
#[derive(Debug, Clone, Copy)]
pub(super) enum TextField {
    Title,
    Subtitle,
    Body,
}

impl TextField {
    fn usage(self) -> &'static str {
        match self {
            TextField::Title => "Формат: /set_title <текст>",
            TextField::Subtitle => "Формат: /set_subtitle <текст>",
            TextField::Body => "Формат: /set_body <текст>",
        }
    }

    fn apply(self, texts: &mut Texts, value: &str) {
        match self {
            TextField::Title => texts.title = value.to_string(),
            TextField::Subtitle => texts.subtitle = value.to_string(),
            TextField::Body => texts.body = value.to_string(),
        }
    }
}

/// Разбирает payload вида "Заголовок | Подзаголовок | Основной текст".
/// Ровно три части, иначе None.
fn parse_texts_payload(raw: &str) -> Option<Texts> {
    let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
    match parts.as_slice() {
        [title, subtitle, body] => Some(Texts {
            title: (*title).to_string(),
            subtitle: (*subtitle).to_string(),
            body: (*body).to_string(),
        }),
        _ => None,
    }
}

fn identity_of(msg: &Message) -> String {
    msg.chat.id.0.to_string()
}

/// Subscription status line used by /start and /status.
fn subscription_status_line(user: &UserRecord) -> String {
    if subscription::is_active(user.subscription_expires_at, Utc::now()) {
        match user.subscription_expires_at {
            Some(expires_at) => format!("Подписка активна до {}", expires_at.to_rfc3339()),
            None => "Подписка активна".to_string(),
        }
    } else {
        "Подписка не активна".to_string()
    }
}

/// Handle /start command
pub(super) async fn handle_start_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user = deps.store.ensure_user(&identity_of(msg)).await?;

    let subscribe_line = if config::PAYMENT_PROVIDER_TOKEN.is_empty() {
        "/subscribe — запросить оплату (требуется подключение платежей Telegram)"
    } else {
        "/subscribe — оплатить подписку на месяц"
    };

    let mut lines = vec![
        "Добро пожаловать! Используйте команды:".to_string(),
        subscribe_line.to_string(),
        "/status — проверить статус подписки".to_string(),
        "/my_token — получить токен для входа в приложение".to_string(),
        "/set_texts Заголовок | Подзаголовок | Основной текст — обновить тексты".to_string(),
        "/set_title <текст> — обновить только заголовок".to_string(),
        "/set_subtitle <текст> — обновить подзаголовок".to_string(),
        "/set_body <текст> — обновить основной текст".to_string(),
        String::new(),
        format!("Ваш токен: {}", user.token),
        subscription_status_line(&user),
    ];
    if let Some(link) = deps.bot_link.as_deref() {
        lines.push(format!("Ссылка на бота: {link}"));
    }

    bot.send_message(msg.chat.id, lines.join("\n")).await?;
    Ok(())
}

/// Handle /help command
pub(super) async fn handle_help_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let commands = [
        "/status",
        "/subscribe",
        "/my_token",
        "/set_texts",
        "/set_title",
        "/set_subtitle",
        "/set_body",
    ];

    let mut text = format!(
        "Доступные команды:\n{}",
        commands.map(|cmd| format!("• {cmd}")).join("\n")
    );
    if let Some(link) = deps.bot_link.as_deref() {
        text.push_str(&format!("\n\nСсылка на бота: {link}"));
    }

    bot.send_message(msg.chat.id, text).await?;
    Ok(())
}

/// Handle /status command
pub(super) async fn handle_status_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user = deps.store.ensure_user(&identity_of(msg)).await?;

    let active = subscription::is_active(user.subscription_expires_at, Utc::now());
    let expires = match user.subscription_expires_at {
        Some(expires_at) => format!("до {}", expires_at.to_rfc3339()),
        None => "не оформлена".to_string(),
    };
    let status = if active { "активна" } else { "не активна" };

    bot.send_message(msg.chat.id, format!("Подписка {status} {expires}.")).await?;
    Ok(())
}

/// Handle /my_token command
pub(super) async fn handle_my_token_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user = deps.store.ensure_user(&identity_of(msg)).await?;
    bot.send_message(msg.chat.id, format!("Ваш токен: {}", user.token)).await?;
    Ok(())
}

/// Handle /subscribe command
///
/// With a configured payment provider this issues a real Telegram invoice;
/// without one the user gets a pointer at the admin (or the hidden
/// /activate path).
pub(super) async fn handle_subscribe_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    deps.store.ensure_user(&identity_of(msg)).await?;

    if config::PAYMENT_PROVIDER_TOKEN.is_empty() {
        let mut text =
            "Платёжный провайдер не настроен. Свяжитесь с администратором или используйте секретную команду для продления."
                .to_string();
        if let Some(link) = deps.bot_link.as_deref() {
            text.push_str(&format!(" Ссылка на бота: {link}"));
        }
        bot.send_message(msg.chat.id, text).await?;
        return Ok(());
    }

    let payload = format!("subscription-{}", msg.chat.id.0);
    bot.send_invoice(
        msg.chat.id,
        "Месячная подписка",
        "Доступ к персональному контенту в приложении на 30 дней.",
        payload,
        config::subscription::CURRENCY.clone(),
        vec![LabeledPrice::new("1 месяц", *config::subscription::PRICE)],
    )
    .provider_token(config::PAYMENT_PROVIDER_TOKEN.clone())
    .await?;

    Ok(())
}

/// Handle a successful payment event: extend by the configured duration.
pub(super) async fn handle_successful_payment(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let identity = identity_of(msg);
    deps.store.ensure_user(&identity).await?;

    let expires_at = deps
        .store
        .extend_subscription(&identity, *config::subscription::DURATION_DAYS, Utc::now())
        .await?;

    bot.send_message(
        msg.chat.id,
        format!("Оплата получена! Подписка активна до {}.", expires_at.to_rfc3339()),
    )
    .await?;
    Ok(())
}

/// Handle the hidden /activate command: `/activate <секрет> [дней]`.
///
/// The schema only routes here when the activation secret is configured.
pub(super) async fn handle_activate_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    args: &str,
) -> Result<(), HandlerError> {
    let mut parts = args.split_whitespace();
    let Some(secret) = parts.next() else {
        bot.send_message(msg.chat.id, "Формат: /activate <секрет> [дней] — вручную продлить подписку.")
            .await?;
        return Ok(());
    };

    if secret != config::SUBSCRIPTION_ACTIVATION_SECRET.as_str() {
        bot.send_message(msg.chat.id, "Неверный секрет.").await?;
        return Ok(());
    }

    let days = match parts.next() {
        Some(raw) => raw.parse::<i64>().ok().filter(|days| *days > 0),
        None => Some(*config::subscription::DURATION_DAYS),
    };
    let Some(days) = days else {
        bot.send_message(msg.chat.id, "Число дней должно быть положительным.").await?;
        return Ok(());
    };

    let identity = identity_of(msg);
    deps.store.ensure_user(&identity).await?;
    let expires_at = deps.store.extend_subscription(&identity, days, Utc::now()).await?;

    bot.send_message(
        msg.chat.id,
        format!("Подписка продлена на {days} дней до {}.", expires_at.to_rfc3339()),
    )
    .await?;
    Ok(())
}

/// Handle /set_texts: all three fields at once, `|`-separated.
pub(super) async fn handle_set_texts_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    payload: &str,
) -> Result<(), HandlerError> {
    let Some(texts) = parse_texts_payload(payload) else {
        bot.send_message(msg.chat.id, "Формат: /set_texts Заголовок | Подзаголовок | Основной текст")
            .await?;
        return Ok(());
    };

    update_texts(bot, msg, deps, move |current| *current = texts).await
}

/// Handle /set_title, /set_subtitle, /set_body.
pub(super) async fn handle_set_field_command(
    bot: &Bot,
    msg: &Message,
    deps: &HandlerDeps,
    field: TextField,
    value: &str,
) -> Result<(), HandlerError> {
    let value = value.trim();
    if value.is_empty() {
        bot.send_message(msg.chat.id, field.usage()).await?;
        return Ok(());
    }

    let value = value.to_string();
    update_texts(bot, msg, deps, move |texts| field.apply(texts, &value)).await
}

/// Shared text-mutation path: subscription gate, store update, confirmation.
async fn update_texts<F>(bot: &Bot, msg: &Message, deps: &HandlerDeps, update: F) -> Result<(), HandlerError>
where
    F: FnOnce(&mut Texts),
{
    let identity = identity_of(msg);
    let user = deps.store.ensure_user(&identity).await?;

    if !ensure_active_subscription(bot, msg.chat.id, &user, deps).await? {
        return Ok(());
    }

    deps.store.update_texts(&identity, Utc::now(), update).await?;
    bot.send_message(msg.chat.id, "Тексты обновлены. Проверьте приложение.").await?;
    Ok(())
}

/// Subscription gate for text mutations. Notifies the user when the window
/// has lapsed and reports whether the mutation may proceed.
async fn ensure_active_subscription(
    bot: &Bot,
    chat_id: ChatId,
    user: &UserRecord,
    deps: &HandlerDeps,
) -> Result<bool, HandlerError> {
    if subscription::is_active(user.subscription_expires_at, Utc::now()) {
        return Ok(true);
    }

    let text = match deps.bot_link.as_deref() {
        Some(link) => format!("Ваша подписка не активна. Оформите или продлите её в боте: {link}"),
        None => "Ваша подписка не активна. Оформите или продлите её в боте.".to_string(),
    };
    bot.send_message(chat_id, text).await?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DEFAULT_SUBTITLE, DEFAULT_TITLE};

    #[test]
    fn test_parse_texts_payload_three_parts() {
        let texts = parse_texts_payload("Заголовок | Подзаголовок | Текст").unwrap();
        assert_eq!(texts.title, "Заголовок");
        assert_eq!(texts.subtitle, "Подзаголовок");
        assert_eq!(texts.body, "Текст");
    }

    #[test]
    fn test_parse_texts_payload_trims_parts() {
        let texts = parse_texts_payload("  A|B  |  C ").unwrap();
        assert_eq!(texts.title, "A");
        assert_eq!(texts.subtitle, "B");
        assert_eq!(texts.body, "C");
    }

    #[test]
    fn test_parse_texts_payload_wrong_arity() {
        assert!(parse_texts_payload("A | B").is_none());
        assert!(parse_texts_payload("A | B | C | D").is_none());
        assert!(parse_texts_payload("").is_none());
    }

    #[test]
    fn test_text_field_apply() {
        let mut texts = Texts::default();
        TextField::Body.apply(&mut texts, "новый текст");
        assert_eq!(texts.body, "новый текст");
        assert_eq!(texts.title, DEFAULT_TITLE);
        assert_eq!(texts.subtitle, DEFAULT_SUBTITLE);
    }
}
