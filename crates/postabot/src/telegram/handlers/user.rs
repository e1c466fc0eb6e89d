//! User-facing screens: welcome, tariffs, channel access and crypto claims

use chrono::Utc;
use indoc::formatdoc;
use postacore::storage::{Tariff, Usage, User};
use postacore::TariffCode;
use teloxide::types::ChatId;
use url::Url;

use super::types::{BotResult, HandlerDeps, Sender};
use crate::telegram::keyboards::{
    crypto_payment_keyboard, join_channel_keyboard, main_menu_keyboard, tariffs_keyboard,
};
use crate::telegram::reply::Reply;

pub const WELCOME_TEXT: &str = "👋 Добро пожаловать в бот автопостинга!\n\nИспользуй меню ниже 👇";
pub const REFRESHED_TEXT: &str = "♻️ Обновлено";
pub const CHANNEL_NOT_CONFIGURED: &str = "❌ Канал не настроен";
pub const MEMBERSHIP_CHECK_TEXT: &str = "⏳ Проверка участия происходит автоматически\nКаждые 30 минут";
pub const PAYMENT_SENT_TEXT: &str = "✅ Чек отправлен админу.\nПодписка активируется после подтверждения.";

fn ensure_user(deps: &HandlerDeps, sender: &Sender) -> BotResult<User> {
    Ok(deps
        .db
        .get_or_create_user(sender.telegram_id, sender.username.as_deref(), Some(&sender.full_name))?)
}

/// `/start`: registers the user and shows the main menu.
pub fn start(deps: &HandlerDeps, sender: &Sender) -> BotResult<Vec<Reply>> {
    ensure_user(deps, sender)?;
    Ok(vec![Reply::with_keyboard(WELCOME_TEXT, main_menu_keyboard())])
}

pub fn refresh() -> Vec<Reply> {
    vec![Reply::with_keyboard(REFRESHED_TEXT, main_menu_keyboard())]
}

pub fn show_tariffs(deps: &HandlerDeps) -> BotResult<Vec<Reply>> {
    let tariffs = deps.db.active_tariffs()?;
    Ok(vec![Reply::with_inline(
        "💎 <b>Доступные тарифы</b>",
        tariffs_keyboard(&tariffs),
    )])
}

fn subscription_text(user: &User, tariff: Option<&Tariff>, usage: &Usage) -> String {
    let now = Utc::now();
    let mut text = format!(
        "📊 <b>Моя подписка</b>\n\n{} Тариф: <b>{}</b>\n",
        user.tariff_code.emoji(),
        tariff.map(|t| t.name.as_str()).unwrap_or(user.tariff_code.as_str())
    );

    match user.subscribed_until {
        Some(until) if until > now => {
            text.push_str(&format!("⏳ Действует до: {}\n", until.format("%d.%m.%Y %H:%M UTC")));
        }
        Some(until) => {
            text.push_str(&format!("⌛ Истекла: {}\n", until.format("%d.%m.%Y %H:%M UTC")));
        }
        None if user.tariff_code.is_paid() => {}
        None => text.push_str("♾ Бесплатный тариф\n"),
    }

    if user.is_frozen {
        match user.frozen_until {
            Some(until) => text.push_str(&format!("❄️ Заморожен до {}\n", until.format("%d.%m.%Y"))),
            None => text.push_str("❄️ Заморожен\n"),
        }
    }

    let (channels_limit, posts_limit) = tariff
        .map(|t| (t.channels_limit.to_string(), t.posts_per_day.to_string()))
        .unwrap_or_else(|| ("?".to_string(), "?".to_string()));
    text.push_str(&format!(
        "\n📢 Каналы: {}/{}\n📝 Постов сегодня: {}/{}",
        usage.channels.len(),
        channels_limit,
        usage.posts_today,
        posts_limit
    ));

    if let Some(post) = &usage.next_post {
        text.push_str(&format!(
            "\n📅 Следующий пост: {}",
            post.scheduled_at.format("%d.%m.%Y %H:%M UTC")
        ));
    }
    text
}

/// "📊 Моя подписка": current tariff, expiry and usage against limits.
pub fn my_subscription(deps: &HandlerDeps, sender: &Sender) -> BotResult<Vec<Reply>> {
    let user = ensure_user(deps, sender)?;
    let tariff = deps.db.tariff(user.tariff_code)?;
    let usage = deps.db.usage(user.id)?;
    Ok(vec![Reply::with_keyboard(
        subscription_text(&user, tariff.as_ref(), &usage),
        main_menu_keyboard(),
    )])
}

/// Stars purchase: point the user at the tariff's private channel.
pub fn buy_tariff(deps: &HandlerDeps, code: TariffCode) -> BotResult<Vec<Reply>> {
    let Some(channel) = deps.db.tariff_channel(code)? else {
        return Ok(vec![Reply::alert(CHANNEL_NOT_CONFIGURED)]);
    };
    let invite_link = match Url::parse(&channel.invite_link) {
        Ok(url) => url,
        Err(e) => {
            log::warn!("Tariff {} has an unusable invite link {:?}: {}", code, channel.invite_link, e);
            return Ok(vec![Reply::alert(CHANNEL_NOT_CONFIGURED)]);
        }
    };

    Ok(vec![Reply::edit(
        format!(
            "🔐 Для активации тарифа <b>{}</b>\nнужно вступить в приватный канал 👇",
            code
        ),
        join_channel_keyboard(invite_link),
    )])
}

pub fn check_channel_join() -> Vec<Reply> {
    vec![Reply::alert(MEMBERSHIP_CHECK_TEXT)]
}

/// Crypto payment instructions. Any tariff code is accepted; the button is
/// only offered for tariffs with a crypto price.
pub fn buy_crypto(code: TariffCode) -> BotResult<Vec<Reply>> {
    Ok(vec![Reply::edit(
        formatdoc!(
            "
            💰 <b>Crypto оплата ({})</b>

            1️⃣ Создай чек в CryptoBot
            2️⃣ Отправь ID чека админу
            3️⃣ Нажми кнопку ниже",
            code
        ),
        crypto_payment_keyboard(code)?,
    )])
}

/// Records the user's payment claim and tells the admins about it.
///
/// The amount is the tariff's crypto price at this moment, empty when the
/// tariff has none; the admin decides either way.
pub fn crypto_sent(deps: &HandlerDeps, sender: &Sender, code: TariffCode) -> BotResult<Vec<Reply>> {
    let user = ensure_user(deps, sender)?;
    let payment = deps.db.record_crypto_payment(user.id, code, None)?;

    let who = match &sender.username {
        Some(username) => format!("@{}", username),
        None => teloxide::utils::html::escape(&sender.full_name),
    };
    let amount = payment.amount.map(|a| format!("${}", a)).unwrap_or_default();
    let notice = format!(
        "💳 Новый крипто-платёж #{}\nТариф: {} {}\nОт: {} (<code>{}</code>)",
        payment.id, code, amount, who, sender.telegram_id
    );

    let mut replies = vec![Reply::text(PAYMENT_SENT_TEXT)];
    replies.extend(deps.admin_ids.iter().map(|admin_id| Reply::Notify {
        chat_id: ChatId(*admin_id),
        text: notice.clone(),
    }));
    Ok(replies)
}

/// "◀️ Назад" under user screens closes the inline menu.
pub fn back() -> Vec<Reply> {
    vec![Reply::Delete]
}
