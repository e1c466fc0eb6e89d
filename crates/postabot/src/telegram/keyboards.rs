//! Keyboard builders for every screen of the bot

use postacore::storage::{PendingPayment, Tariff};
use postacore::TariffCode;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};
use url::Url;

use super::callbacks::CallbackAction;
use super::menu::MenuButton;

/// Where users create a crypto check
pub const CRYPTO_BOT_URL: &str = "https://t.me/CryptoBot?start=create";

const BACK: &str = "◀️ Назад";

fn button(button: MenuButton) -> KeyboardButton {
    KeyboardButton::new(button.text())
}

fn cb(text: impl Into<String>, action: CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.to_string())
}

pub fn main_menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![button(MenuButton::MySubscription)],
        vec![button(MenuButton::Tariffs)],
        vec![button(MenuButton::Refresh)],
    ])
    .resize_keyboard()
}

pub fn admin_menu_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![button(MenuButton::AdminTariffs), button(MenuButton::AdminChannels)],
        vec![button(MenuButton::AdminCrypto)],
        vec![button(MenuButton::AdminExit)],
    ])
    .resize_keyboard()
}

/// One Stars button per tariff, plus a crypto button where a crypto price is set.
pub fn tariffs_keyboard(tariffs: &[Tariff]) -> InlineKeyboardMarkup {
    let mut rows = Vec::with_capacity(tariffs.len() * 2 + 1);
    for tariff in tariffs {
        rows.push(vec![cb(
            format!("{} — {}⭐", tariff.name, tariff.stars_price),
            CallbackAction::BuyTariff(tariff.code),
        )]);
        if let Some(price) = tariff.crypto_price.filter(|_| tariff.accepts_crypto()) {
            rows.push(vec![cb(
                format!("{} (Crypto ${})", tariff.name, price),
                CallbackAction::BuyCrypto(tariff.code),
            )]);
        }
    }
    rows.push(vec![cb(BACK, CallbackAction::Back)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn join_channel_keyboard(invite_link: Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("🔐 Вступить в приватный канал", invite_link)],
        vec![cb("✅ Я вступил", CallbackAction::CheckChannelJoin)],
    ])
}

pub fn crypto_payment_keyboard(code: TariffCode) -> Result<InlineKeyboardMarkup, url::ParseError> {
    Ok(InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url("🤖 Создать чек в CryptoBot", Url::parse(CRYPTO_BOT_URL)?)],
        vec![cb("✅ Я отправил чек админу", CallbackAction::CryptoSent(code))],
        vec![cb(BACK, CallbackAction::Back)],
    ]))
}

pub fn admin_tariffs_keyboard(tariffs: &[Tariff]) -> InlineKeyboardMarkup {
    let mut rows: Vec<_> = tariffs
        .iter()
        .map(|tariff| {
            let state = if tariff.is_active { "ON" } else { "OFF" };
            vec![cb(
                format!("{} ({})", tariff.name, state),
                CallbackAction::AdminTariff(tariff.code),
            )]
        })
        .collect();
    rows.push(vec![cb(BACK, CallbackAction::AdminBack)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_tariff_manage_keyboard(code: TariffCode) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![cb("🔁 Вкл / Выкл", CallbackAction::ToggleTariff(code))],
        vec![cb(BACK, CallbackAction::AdminTariffs)],
    ])
}

pub fn admin_tariff_channels_keyboard(tariffs: &[Tariff]) -> InlineKeyboardMarkup {
    let mut rows: Vec<_> = tariffs
        .iter()
        .map(|tariff| {
            vec![cb(
                format!("🔐 {}", tariff.name),
                CallbackAction::SetTariffChannel(tariff.code),
            )]
        })
        .collect();
    rows.push(vec![cb(BACK, CallbackAction::AdminBack)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_crypto_payments_keyboard(payments: &[PendingPayment]) -> InlineKeyboardMarkup {
    let mut rows: Vec<_> = payments
        .iter()
        .map(|pending| {
            let payment = &pending.payment;
            let amount = payment
                .amount
                .map(|amount| format!("${}", amount))
                .unwrap_or_else(|| "$?".to_string());
            vec![cb(
                format!("#{} | {} | {}", payment.id, payment.tariff_code, amount),
                CallbackAction::CryptoPayment(payment.id),
            )]
        })
        .collect();
    rows.push(vec![cb(BACK, CallbackAction::AdminBack)]);
    InlineKeyboardMarkup::new(rows)
}

pub fn admin_crypto_action_keyboard(payment_id: i64) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            cb("✅ Подтвердить", CallbackAction::CryptoApprove(payment_id)),
            cb("❌ Отклонить", CallbackAction::CryptoReject(payment_id)),
        ],
        vec![cb(BACK, CallbackAction::AdminCrypto)],
    ])
}


#[cfg(test)]
mod tests {
    use super::test_support::{inline_buttons, reply_texts};
    use super::*;
    use chrono::Utc;
    use postacore::storage::CryptoPayment;
    use pretty_assertions::assert_eq;

    fn tariff(code: TariffCode, stars: i64, crypto: Option<f64>, active: bool) -> Tariff {
        Tariff {
            code,
            name: code.as_str().to_string(),
            channels_limit: 1,
            posts_per_day: 3,
            stars_price: stars,
            crypto_price: crypto,
            is_active: active,
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn test_main_and_admin_menus() {
        let main = main_menu_keyboard();
        assert!(main.resize_keyboard);
        assert_eq!(
            reply_texts(&main),
            vec!["📊 Моя подписка", "💎 Тарифы и подписка", "🔄 Обновить"]
        );
        assert_eq!(
            reply_texts(&admin_menu_keyboard()),
            vec!["⚙️ Тарифы", "🔐 Каналы тарифов", "💳 Крипто-платежи", "🏠 Выйти"]
        );
    }

    #[test]
    fn test_tariffs_keyboard_crypto_only_when_priced() {
        let markup = tariffs_keyboard(&[
            tariff(TariffCode::Standard, 300, None, true),
            tariff(TariffCode::Pro, 500, Some(4.0), true),
            tariff(TariffCode::Vip, 800, Some(6.5), true),
        ]);

        assert_eq!(
            inline_buttons(&markup),
            pairs(&[
                ("STANDARD — 300⭐", "buy_tariff:STANDARD"),
                ("PRO — 500⭐", "buy_tariff:PRO"),
                ("PRO (Crypto $4)", "buy_crypto:PRO"),
                ("VIP — 800⭐", "buy_tariff:VIP"),
                ("VIP (Crypto $6.5)", "buy_crypto:VIP"),
                ("◀️ Назад", "back"),
            ])
        );
    }

    #[test]
    fn test_zero_crypto_price_hides_crypto_button() {
        let markup = tariffs_keyboard(&[tariff(TariffCode::Mini, 0, Some(0.0), true)]);
        assert_eq!(
            inline_buttons(&markup),
            pairs(&[("MINI — 0⭐", "buy_tariff:MINI"), ("◀️ Назад", "back")])
        );
    }

    #[test]
    fn test_join_and_crypto_keyboards() {
        let invite = Url::parse("https://t.me/+abcdef").unwrap();
        assert_eq!(
            inline_buttons(&join_channel_keyboard(invite)),
            pairs(&[
                ("🔐 Вступить в приватный канал", "https://t.me/+abcdef"),
                ("✅ Я вступил", "check_channel_join"),
            ])
        );

        let crypto = crypto_payment_keyboard(TariffCode::Pro).unwrap();
        assert_eq!(
            inline_buttons(&crypto),
            pairs(&[
                ("🤖 Создать чек в CryptoBot", CRYPTO_BOT_URL),
                ("✅ Я отправил чек админу", "crypto_sent:PRO"),
                ("◀️ Назад", "back"),
            ])
        );
    }

    #[test]
    fn test_admin_tariff_keyboards() {
        let tariffs = [
            tariff(TariffCode::Mini, 0, None, true),
            tariff(TariffCode::Standard, 300, None, false),
        ];

        assert_eq!(
            inline_buttons(&admin_tariffs_keyboard(&tariffs)),
            pairs(&[
                ("MINI (ON)", "admin_tariff:MINI"),
                ("STANDARD (OFF)", "admin_tariff:STANDARD"),
                ("◀️ Назад", "admin_back"),
            ])
        );
        assert_eq!(
            inline_buttons(&admin_tariff_manage_keyboard(TariffCode::Standard)),
            pairs(&[("🔁 Вкл / Выкл", "toggle_tariff:STANDARD"), ("◀️ Назад", "admin_tariffs")])
        );
        assert_eq!(
            inline_buttons(&admin_tariff_channels_keyboard(&tariffs)),
            pairs(&[
                ("🔐 MINI", "set_tariff_channel:MINI"),
                ("🔐 STANDARD", "set_tariff_channel:STANDARD"),
                ("◀️ Назад", "admin_back"),
            ])
        );
    }

    #[test]
    fn test_crypto_payment_keyboards() {
        let pending = PendingPayment {
            payment: CryptoPayment {
                id: 12,
                user_id: 1,
                tariff_code: TariffCode::Vip,
                amount: Some(6.5),
                check_id: None,
                confirmed: false,
                rejected: false,
                created_at: Utc::now(),
            },
            telegram_id: 555,
        };

        assert_eq!(
            inline_buttons(&admin_crypto_payments_keyboard(&[pending])),
            pairs(&[("#12 | VIP | $6.5", "crypto_payment:12"), ("◀️ Назад", "admin_back")])
        );

        let action = admin_crypto_action_keyboard(12);
        assert_eq!(action.inline_keyboard[0].len(), 2);
        assert_eq!(
            inline_buttons(&action),
            pairs(&[
                ("✅ Подтвердить", "crypto_approve:12"),
                ("❌ Отклонить", "crypto_reject:12"),
                ("◀️ Назад", "admin_crypto"),
            ])
        );
    }
}
