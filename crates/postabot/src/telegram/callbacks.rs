//! Inline button payloads
//!
//! Callback data is `action` or `action:payload`. It is decoded once into a
//! [`CallbackAction`] at the dispatcher boundary; keyboards build their data
//! through the `Display` impl so both directions stay in sync.

use std::fmt;
use std::str::FromStr;

use postacore::TariffCode;

/// Every button press the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    BuyTariff(TariffCode),
    BuyCrypto(TariffCode),
    CryptoSent(TariffCode),
    CheckChannelJoin,
    AdminTariff(TariffCode),
    ToggleTariff(TariffCode),
    SetTariffChannel(TariffCode),
    CryptoPayment(i64),
    CryptoApprove(i64),
    CryptoReject(i64),
    Back,
    AdminBack,
    AdminTariffs,
    AdminCrypto,
}

impl CallbackAction {
    /// Decodes callback data. Unknown actions and bad payloads give `None`.
    pub fn parse(data: &str) -> Option<Self> {
        let (action, payload) = match data.split_once(':') {
            Some((action, payload)) => (action, Some(payload)),
            None => (data, None),
        };

        let action = match (action, payload) {
            ("check_channel_join", None) => Self::CheckChannelJoin,
            ("back", None) => Self::Back,
            ("admin_back", None) => Self::AdminBack,
            ("admin_tariffs", None) => Self::AdminTariffs,
            ("admin_crypto", None) => Self::AdminCrypto,
            ("buy_tariff", Some(code)) => Self::BuyTariff(tariff(code)?),
            ("buy_crypto", Some(code)) => Self::BuyCrypto(tariff(code)?),
            ("crypto_sent", Some(code)) => Self::CryptoSent(tariff(code)?),
            ("admin_tariff", Some(code)) => Self::AdminTariff(tariff(code)?),
            ("toggle_tariff", Some(code)) => Self::ToggleTariff(tariff(code)?),
            ("set_tariff_channel", Some(code)) => Self::SetTariffChannel(tariff(code)?),
            ("crypto_payment", Some(id)) => Self::CryptoPayment(payment_id(id)?),
            ("crypto_approve", Some(id)) => Self::CryptoApprove(payment_id(id)?),
            ("crypto_reject", Some(id)) => Self::CryptoReject(payment_id(id)?),
            _ => return None,
        };
        Some(action)
    }

    /// Actions that only admins may trigger.
    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Self::AdminTariff(_)
                | Self::ToggleTariff(_)
                | Self::SetTariffChannel(_)
                | Self::CryptoPayment(_)
                | Self::CryptoApprove(_)
                | Self::CryptoReject(_)
                | Self::AdminBack
                | Self::AdminTariffs
                | Self::AdminCrypto
        )
    }
}

fn tariff(code: &str) -> Option<TariffCode> {
    TariffCode::from_str(code).ok()
}

fn payment_id(id: &str) -> Option<i64> {
    id.parse::<i64>().ok().filter(|id| *id > 0)
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuyTariff(code) => write!(f, "buy_tariff:{}", code),
            Self::BuyCrypto(code) => write!(f, "buy_crypto:{}", code),
            Self::CryptoSent(code) => write!(f, "crypto_sent:{}", code),
            Self::CheckChannelJoin => f.write_str("check_channel_join"),
            Self::AdminTariff(code) => write!(f, "admin_tariff:{}", code),
            Self::ToggleTariff(code) => write!(f, "toggle_tariff:{}", code),
            Self::SetTariffChannel(code) => write!(f, "set_tariff_channel:{}", code),
            Self::CryptoPayment(id) => write!(f, "crypto_payment:{}", id),
            Self::CryptoApprove(id) => write!(f, "crypto_approve:{}", id),
            Self::CryptoReject(id) => write!(f, "crypto_reject:{}", id),
            Self::Back => f.write_str("back"),
            Self::AdminBack => f.write_str("admin_back"),
            Self::AdminTariffs => f.write_str("admin_tariffs"),
            Self::AdminCrypto => f.write_str("admin_crypto"),
        }
    }
}
