//! Update routing: decoded commands, menu texts and button presses mapped to
//! handler logic
//!
//! Everything here is synchronous and returns the [`Reply`] list to send, so
//! it can be tested against a real database without Telegram.

pub mod admin;
pub mod schema;
pub mod types;
pub mod user;

pub use schema::schema;
pub use types::{BotError, BotResult, HandlerDeps, HandlerError, Sender};

use crate::telegram::bot::Command;
use crate::telegram::callbacks::CallbackAction;
use crate::telegram::menu::MenuButton;
use crate::telegram::reply::Reply;

pub fn route_command(deps: &HandlerDeps, sender: &Sender, command: &Command) -> BotResult<Vec<Reply>> {
    match command {
        Command::Start => {
            // /start also abandons a half-finished channel binding
            deps.bindings.finish(sender.telegram_id);
            user::start(deps, sender)
        }
        Command::Admin => Ok(admin::admin_panel(deps, sender.telegram_id)),
    }
}

/// Routes a plain text message. `None` means the text is not for the bot.
///
/// Admin menu texts from non-admins fall through like any other text.
pub fn route_text(deps: &HandlerDeps, sender: &Sender, text: &str) -> BotResult<Option<Vec<Reply>>> {
    let is_admin = deps.is_admin(sender.telegram_id);

    let button = match MenuButton::from_text(text) {
        Some(button) if button.is_admin() && !is_admin => None,
        other => other,
    };

    let Some(button) = button else {
        if is_admin {
            return admin::channel_binding_input(deps, sender.telegram_id, text);
        }
        return Ok(None);
    };

    let replies = match button {
        MenuButton::Tariffs => user::show_tariffs(deps)?,
        MenuButton::MySubscription => user::my_subscription(deps, sender)?,
        MenuButton::Refresh => user::refresh(),
        MenuButton::AdminTariffs => admin::tariffs(deps)?,
        MenuButton::AdminChannels => admin::channels(deps)?,
        MenuButton::AdminCrypto => admin::crypto_payments(deps)?,
        MenuButton::AdminExit => admin::exit(deps, sender.telegram_id),
    };
    Ok(Some(replies))
}

pub fn route_callback(deps: &HandlerDeps, sender: &Sender, action: CallbackAction) -> BotResult<Vec<Reply>> {
    if action.is_admin_only() && !deps.is_admin(sender.telegram_id) {
        log::warn!("Non-admin {} pressed admin button {}", sender.telegram_id, action);
        return Ok(vec![Reply::alert(admin::NO_ACCESS)]);
    }

    match action {
        CallbackAction::BuyTariff(code) => user::buy_tariff(deps, code),
        CallbackAction::BuyCrypto(code) => user::buy_crypto(code),
        CallbackAction::CryptoSent(code) => user::crypto_sent(deps, sender, code),
        CallbackAction::CheckChannelJoin => Ok(user::check_channel_join()),
        CallbackAction::Back => Ok(user::back()),
        CallbackAction::AdminTariff(code) => admin::tariff_detail(deps, code),
        CallbackAction::ToggleTariff(code) => admin::toggle_tariff(deps, code),
        CallbackAction::SetTariffChannel(code) => Ok(admin::set_tariff_channel(deps, sender.telegram_id, code)),
        CallbackAction::CryptoPayment(id) => admin::crypto_payment_detail(deps, id),
        CallbackAction::CryptoApprove(id) => admin::approve_payment(deps, id),
        CallbackAction::CryptoReject(id) => admin::reject_payment(deps, id),
        CallbackAction::AdminBack => Ok(admin::back()),
        CallbackAction::AdminTariffs => admin::tariffs_edit(deps),
        CallbackAction::AdminCrypto => admin::crypto_payments_edit(deps),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use postacore::storage::{Database, PoolSettings};
    use tempfile::TempDir;

    use super::types::{HandlerDeps, Sender};

    pub struct TestDeps {
        pub deps: HandlerDeps,
        pub _dir: TempDir,
    }

    pub fn deps(admin_ids: &[i64]) -> TestDeps {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot.sqlite");
        let db = Database::open_with(path.to_str().unwrap(), PoolSettings { min_idle: 1, max_size: 4 }).unwrap();
        TestDeps {
            deps: HandlerDeps::new(db, admin_ids.to_vec(), 30),
            _dir: dir,
        }
    }

    pub fn sender(telegram_id: i64, username: Option<&str>, full_name: &str) -> Sender {
        Sender {
            telegram_id,
            username: username.map(str::to_string),
            full_name: full_name.to_string(),
        }
    }
}
