//! Admin screens: tariffs, channel bindings and crypto payment review

use indoc::formatdoc;
use postacore::storage::{ApprovalOutcome, CryptoPayment, RejectionOutcome};
use postacore::TariffCode;
use teloxide::types::ChatId;
use teloxide::utils::html;

use super::types::{BotResult, HandlerDeps};
use crate::telegram::admin::{parse_channel_binding, BindingParseError};
use crate::telegram::keyboards::{
    admin_crypto_action_keyboard, admin_crypto_payments_keyboard, admin_menu_keyboard, admin_tariff_channels_keyboard,
    admin_tariff_manage_keyboard, admin_tariffs_keyboard, main_menu_keyboard,
};
use crate::telegram::reply::Reply;

pub const NO_ACCESS: &str = "⛔ Нет доступа";
pub const ADMIN_PANEL_TEXT: &str = "⚙️ Админ-панель";
pub const NO_PENDING_PAYMENTS: &str = "Нет ожидающих платежей";
pub const PENDING_PAYMENTS_TEXT: &str = "💳 Ожидают подтверждения";
pub const TARIFF_NOT_FOUND: &str = "❌ Тариф не найден";
pub const PAYMENT_NOT_FOUND: &str = "❌ Платёж не найден";
pub const ALREADY_PROCESSED: &str = "⚠️ Платёж уже обработан";
pub const SUBSCRIPTION_ACTIVATED: &str = "✅ Подписка активирована";
pub const PAYMENT_REJECTED: &str = "❌ Платёж отклонён";
pub const STATUS_CHANGED: &str = "🔁 Статус изменён";
pub const CHANNEL_TAKEN: &str = "❌ Этот канал уже привязан к другому тарифу";

/// `/admin`
pub fn admin_panel(deps: &HandlerDeps, telegram_id: i64) -> Vec<Reply> {
    if !deps.is_admin(telegram_id) {
        log::warn!("Non-admin {} tried to open the admin panel", telegram_id);
        return vec![Reply::text(NO_ACCESS)];
    }
    vec![Reply::with_keyboard(ADMIN_PANEL_TEXT, admin_menu_keyboard())]
}

/// "🏠 Выйти": back to the user menu, dropping any half-finished binding.
pub fn exit(deps: &HandlerDeps, telegram_id: i64) -> Vec<Reply> {
    deps.bindings.finish(telegram_id);
    vec![Reply::with_keyboard("🏠 Главное меню", main_menu_keyboard())]
}

pub fn tariffs(deps: &HandlerDeps) -> BotResult<Vec<Reply>> {
    let tariffs = deps.db.all_tariffs()?;
    Ok(vec![Reply::with_inline(
        "⚙️ Управление тарифами",
        admin_tariffs_keyboard(&tariffs),
    )])
}

/// Same list, redrawn in place after "◀️ Назад" from a tariff.
pub fn tariffs_edit(deps: &HandlerDeps) -> BotResult<Vec<Reply>> {
    let tariffs = deps.db.all_tariffs()?;
    Ok(vec![Reply::edit("⚙️ Управление тарифами", admin_tariffs_keyboard(&tariffs))])
}

pub fn tariff_detail(deps: &HandlerDeps, code: TariffCode) -> BotResult<Vec<Reply>> {
    let Some(tariff) = deps.db.tariff(code)? else {
        return Ok(vec![Reply::alert(TARIFF_NOT_FOUND)]);
    };
    let channel = deps.db.tariff_channel(code)?;

    let crypto = tariff
        .crypto_price
        .map(|price| format!("${}", price))
        .unwrap_or_else(|| "-".to_string());
    let channel = channel
        .map(|c| format!("<code>{}</code>", c.channel_id))
        .unwrap_or_else(|| "не настроен".to_string());
    let text = formatdoc!(
        "
        ⚙️ Тариф <b>{}</b>

        Каналов: {}
        Постов в день: {}
        Цена: {}⭐ / {}
        Канал: {}
        Статус: {}",
        code,
        tariff.channels_limit,
        tariff.posts_per_day,
        tariff.stars_price,
        crypto,
        channel,
        if tariff.is_active { "ON" } else { "OFF" }
    );
    Ok(vec![Reply::edit(text, admin_tariff_manage_keyboard(code))])
}

pub fn toggle_tariff(deps: &HandlerDeps, code: TariffCode) -> BotResult<Vec<Reply>> {
    Ok(match deps.db.toggle_tariff(code)? {
        Some(_) => vec![Reply::alert(STATUS_CHANGED)],
        None => vec![Reply::alert(TARIFF_NOT_FOUND)],
    })
}

pub fn channels(deps: &HandlerDeps) -> BotResult<Vec<Reply>> {
    let tariffs = deps.db.all_tariffs()?;
    Ok(vec![Reply::with_inline(
        "🔐 Приватные каналы тарифов",
        admin_tariff_channels_keyboard(&tariffs),
    )])
}

fn binding_prompt(code: TariffCode) -> String {
    format!(
        "📨 Пришли ID канала и invite-ссылку\nФормат:\n<code>-1001234567890 https://t.me/+xxxx</code>\n\nТариф: {}",
        code
    )
}

/// Starts the channel binding; the admin's next text completes it.
pub fn set_tariff_channel(deps: &HandlerDeps, admin_id: i64, code: TariffCode) -> Vec<Reply> {
    deps.bindings.start(admin_id, code);
    vec![Reply::text(binding_prompt(code))]
}

/// Completes a pending binding. `None` when the admin has nothing pending.
pub fn channel_binding_input(deps: &HandlerDeps, admin_id: i64, text: &str) -> BotResult<Option<Vec<Reply>>> {
    let Some(code) = deps.bindings.pending(admin_id) else {
        return Ok(None);
    };

    let binding = match parse_channel_binding(text) {
        Ok(binding) => binding,
        Err(e) => {
            let hint = match e {
                BindingParseError::WrongShape => "❌ Нужно два значения через пробел",
                BindingParseError::BadChannelId => "❌ ID канала должен быть отрицательным числом",
                BindingParseError::BadInviteLink => "❌ Некорректная invite-ссылка",
            };
            return Ok(Some(vec![Reply::text(format!("{}\n\n{}", hint, binding_prompt(code)))]));
        }
    };

    match deps
        .db
        .bind_tariff_channel(code, binding.channel_id, binding.invite_link.as_str())
    {
        Ok(channel) => {
            deps.bindings.finish(admin_id);
            Ok(Some(vec![Reply::text(format!(
                "✅ Канал <code>{}</code> привязан к тарифу <b>{}</b>\n{}",
                channel.channel_id,
                code,
                html::escape(&channel.invite_link)
            ))]))
        }
        Err(e) if e.is_constraint_violation() => Ok(Some(vec![Reply::text(CHANNEL_TAKEN)])),
        Err(e) => Err(e.into()),
    }
}

pub fn crypto_payments(deps: &HandlerDeps) -> BotResult<Vec<Reply>> {
    let pending = deps.db.pending_crypto_payments()?;
    if pending.is_empty() {
        return Ok(vec![Reply::text(NO_PENDING_PAYMENTS)]);
    }
    Ok(vec![Reply::with_inline(
        PENDING_PAYMENTS_TEXT,
        admin_crypto_payments_keyboard(&pending),
    )])
}

/// Pending list redrawn in place after "◀️ Назад" from a payment.
pub fn crypto_payments_edit(deps: &HandlerDeps) -> BotResult<Vec<Reply>> {
    let pending = deps.db.pending_crypto_payments()?;
    if pending.is_empty() {
        return Ok(vec![Reply::Edit {
            text: NO_PENDING_PAYMENTS.to_string(),
            markup: None,
        }]);
    }
    Ok(vec![Reply::edit(
        PENDING_PAYMENTS_TEXT,
        admin_crypto_payments_keyboard(&pending),
    )])
}

fn payment_summary(payment: &CryptoPayment) -> String {
    let amount = payment
        .amount
        .map(|amount| format!("${}", amount))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Тариф: {}\nСумма: {}\nСоздан: {}",
        payment.tariff_code,
        amount,
        payment.created_at.format("%d.%m.%Y %H:%M UTC")
    )
}

pub fn crypto_payment_detail(deps: &HandlerDeps, payment_id: i64) -> BotResult<Vec<Reply>> {
    let Some(payment) = deps.db.crypto_payment(payment_id)? else {
        return Ok(vec![Reply::alert(PAYMENT_NOT_FOUND)]);
    };
    if !payment.is_pending() {
        return Ok(vec![Reply::alert(ALREADY_PROCESSED)]);
    }

    Ok(vec![Reply::edit(
        format!("Подтвердить платёж #{}?\n\n{}", payment_id, payment_summary(&payment)),
        admin_crypto_action_keyboard(payment_id),
    )])
}

pub fn approve_payment(deps: &HandlerDeps, payment_id: i64) -> BotResult<Vec<Reply>> {
    Ok(match deps.db.approve_crypto_payment(payment_id, deps.grant_days)? {
        ApprovalOutcome::Approved {
            telegram_id,
            tariff_code,
            subscribed_until,
            ..
        } => vec![
            Reply::alert(SUBSCRIPTION_ACTIVATED),
            Reply::Edit {
                text: format!("✅ Платёж #{} подтверждён", payment_id),
                markup: None,
            },
            Reply::Notify {
                chat_id: ChatId(telegram_id),
                text: format!(
                    "🎉 Оплата подтверждена!\nТариф <b>{}</b> активен до {}",
                    tariff_code,
                    subscribed_until.format("%d.%m.%Y %H:%M UTC")
                ),
            },
        ],
        ApprovalOutcome::AlreadyProcessed => vec![Reply::alert(ALREADY_PROCESSED)],
        ApprovalOutcome::NotFound => vec![Reply::alert(PAYMENT_NOT_FOUND)],
    })
}

pub fn reject_payment(deps: &HandlerDeps, payment_id: i64) -> BotResult<Vec<Reply>> {
    Ok(match deps.db.reject_crypto_payment(payment_id)? {
        RejectionOutcome::Rejected { telegram_id } => vec![
            Reply::alert(PAYMENT_REJECTED),
            Reply::Edit {
                text: format!("❌ Платёж #{} отклонён", payment_id),
                markup: None,
            },
            Reply::Notify {
                chat_id: ChatId(telegram_id),
                text: format!(
                    "❌ Платёж #{} отклонён.\nЕсли это ошибка, свяжись с администратором.",
                    payment_id
                ),
            },
        ],
        RejectionOutcome::AlreadyProcessed => vec![Reply::alert(ALREADY_PROCESSED)],
        RejectionOutcome::NotFound => vec![Reply::alert(PAYMENT_NOT_FOUND)],
    })
}

/// "◀️ Назад" from the top-level admin lists closes them.
pub fn back() -> Vec<Reply> {
    vec![Reply::Delete]
}
