//! Typed records for every table
//!
//! Rows are mapped into these structs inside the gateway only; nothing outside
//! `storage` touches `rusqlite::Row`.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::Serialize;

use crate::core::types::TariffCode;

/// A bot user, created on first interaction and never deleted.
///
/// `tariff_code` / `subscribed_until` are the denormalized current entitlement;
/// the `subscriptions` table keeps the history.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub tariff_code: TariffCode,
    pub subscribed_until: Option<DateTime<Utc>>,
    pub is_frozen: bool,
    pub frozen_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub(crate) const COLUMNS: &'static str =
        "id, telegram_id, username, full_name, tariff_code, subscribed_until, is_frozen, frozen_until, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            telegram_id: row.get(1)?,
            username: row.get(2)?,
            full_name: row.get(3)?,
            tariff_code: row.get(4)?,
            subscribed_until: row.get(5)?,
            is_frozen: row.get(6)?,
            frozen_until: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    /// Whether a paid entitlement is still running at `now`.
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.subscribed_until.is_some_and(|until| until > now)
    }
}

/// A subscription tier with its limits and prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tariff {
    pub code: TariffCode,
    pub name: String,
    pub channels_limit: i64,
    pub posts_per_day: i64,
    /// Price in Telegram Stars
    pub stars_price: i64,
    /// Price in USD for the manual crypto flow; `None` means crypto is not offered
    pub crypto_price: Option<f64>,
    pub is_active: bool,
}

impl Tariff {
    pub(crate) const COLUMNS: &'static str =
        "code, name, channels_limit, posts_per_day, stars_price, crypto_price, is_active";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            code: row.get(0)?,
            name: row.get(1)?,
            channels_limit: row.get(2)?,
            posts_per_day: row.get(3)?,
            stars_price: row.get(4)?,
            crypto_price: row.get(5)?,
            is_active: row.get(6)?,
        })
    }

    pub fn accepts_crypto(&self) -> bool {
        self.crypto_price.is_some_and(|price| price > 0.0)
    }
}

/// The single private channel bound to a tariff.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffChannel {
    pub tariff_code: TariffCode,
    pub channel_id: i64,
    pub invite_link: String,
}

impl TariffChannel {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            tariff_code: row.get(0)?,
            channel_id: row.get(1)?,
            invite_link: row.get(2)?,
        })
    }
}

/// Append-only history row written on every tariff grant.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub tariff_code: TariffCode,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub active: bool,
}

impl Subscription {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            tariff_code: row.get(2)?,
            started_at: row.get(3)?,
            ends_at: row.get(4)?,
            active: row.get(5)?,
        })
    }
}

/// A channel the user posts into.
#[derive(Debug, Clone, PartialEq)]
pub struct UserChannel {
    pub id: i64,
    pub user_id: i64,
    pub channel_id: i64,
    pub title: Option<String>,
    pub active: bool,
}

impl UserChannel {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            channel_id: row.get(2)?,
            title: row.get(3)?,
            active: row.get(4)?,
        })
    }
}

/// A post queued for publication. `media` is an opaque JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledPost {
    pub id: i64,
    pub user_id: i64,
    pub channel_id: i64,
    pub text: Option<String>,
    pub media: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub published: bool,
    pub is_frozen: bool,
}

impl ScheduledPost {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            channel_id: row.get(2)?,
            text: row.get(3)?,
            media: row.get(4)?,
            scheduled_at: row.get(5)?,
            published: row.get(6)?,
            is_frozen: row.get(7)?,
        })
    }
}

/// A user's claim of a manual crypto payment.
#[derive(Debug, Clone, PartialEq)]
pub struct CryptoPayment {
    pub id: i64,
    pub user_id: i64,
    pub tariff_code: TariffCode,
    /// Copied from `tariffs.crypto_price` when the claim was recorded
    pub amount: Option<f64>,
    pub check_id: Option<String>,
    pub confirmed: bool,
    pub rejected: bool,
    pub created_at: DateTime<Utc>,
}

impl CryptoPayment {
    pub(crate) const COLUMNS: &'static str =
        "id, user_id, tariff_code, amount, check_id, confirmed, rejected, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            tariff_code: row.get(2)?,
            amount: row.get(3)?,
            check_id: row.get(4)?,
            confirmed: row.get(5)?,
            rejected: row.get(6)?,
            created_at: row.get(7)?,
        })
    }

    pub fn is_pending(&self) -> bool {
        !self.confirmed && !self.rejected
    }
}

/// An unprocessed payment together with its owner's Telegram id.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPayment {
    pub payment: CryptoPayment,
    pub telegram_id: i64,
}

/// Result of an admin approving a crypto payment.
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalOutcome {
    /// Payment flipped to confirmed and the tariff was granted
    Approved {
        user_id: i64,
        telegram_id: i64,
        tariff_code: TariffCode,
        subscribed_until: DateTime<Utc>,
    },
    /// Payment was already confirmed or rejected; nothing changed
    AlreadyProcessed,
    NotFound,
}

/// Result of an admin rejecting a crypto payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionOutcome {
    Rejected { telegram_id: i64 },
    AlreadyProcessed,
    NotFound,
}

/// Channel/post usage measured against the user's tariff limits.
#[derive(Debug, Clone, PartialEq)]
pub struct Usage {
    pub channels: Vec<UserChannel>,
    pub posts_today: i64,
    pub next_post: Option<ScheduledPost>,
}
