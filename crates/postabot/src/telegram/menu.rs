//! Reply-keyboard buttons, matched by their exact text

use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
pub enum MenuButton {
    #[strum(serialize = "💎 Тарифы и подписка")]
    Tariffs,
    #[strum(serialize = "📊 Моя подписка")]
    MySubscription,
    #[strum(serialize = "🔄 Обновить")]
    Refresh,
    #[strum(serialize = "⚙️ Тарифы")]
    AdminTariffs,
    #[strum(serialize = "🔐 Каналы тарифов")]
    AdminChannels,
    #[strum(serialize = "💳 Крипто-платежи")]
    AdminCrypto,
    #[strum(serialize = "🏠 Выйти")]
    AdminExit,
}

impl MenuButton {
    pub fn from_text(text: &str) -> Option<Self> {
        Self::from_str(text).ok()
    }

    pub fn text(&self) -> &'static str {
        self.into()
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminTariffs | Self::AdminChannels | Self::AdminCrypto | Self::AdminExit
        )
    }
}
