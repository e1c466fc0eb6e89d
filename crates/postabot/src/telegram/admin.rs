//! Admin helpers: access checks and the pending channel-binding state

use std::sync::Arc;

use dashmap::DashMap;
use postacore::TariffCode;
use url::Url;

/// Admins who pressed "bind channel" and have not sent the channel yet,
/// keyed by their Telegram id.
#[derive(Clone, Default)]
pub struct ChannelBindings {
    pending: Arc<DashMap<i64, TariffCode>>,
}

impl ChannelBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers that the admin's next text binds a channel to `code`.
    /// A second press replaces the tariff.
    pub fn start(&self, admin_id: i64, code: TariffCode) {
        self.pending.insert(admin_id, code);
    }

    pub fn pending(&self, admin_id: i64) -> Option<TariffCode> {
        self.pending.get(&admin_id).map(|entry| *entry.value())
    }

    pub fn finish(&self, admin_id: i64) -> Option<TariffCode> {
        self.pending.remove(&admin_id).map(|(_, code)| code)
    }
}

/// Channel id and invite link sent by an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBinding {
    pub channel_id: i64,
    pub invite_link: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingParseError {
    WrongShape,
    BadChannelId,
    BadInviteLink,
}

/// Parses `<channel_id> <invite_link>`, e.g. `-1001234567890 https://t.me/+xxxx`.
pub fn parse_channel_binding(text: &str) -> Result<ChannelBinding, BindingParseError> {
    let mut parts = text.split_whitespace();
    let (Some(id), Some(link), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(BindingParseError::WrongShape);
    };

    // Channels and supergroups always have negative ids
    let channel_id = id
        .parse::<i64>()
        .ok()
        .filter(|id| *id < 0)
        .ok_or(BindingParseError::BadChannelId)?;

    let invite_link = Url::parse(link)
        .ok()
        .filter(|url| matches!(url.scheme(), "https" | "http") && url.host_str().is_some())
        .ok_or(BindingParseError::BadInviteLink)?;

    Ok(ChannelBinding {
        channel_id,
        invite_link,
    })
}
