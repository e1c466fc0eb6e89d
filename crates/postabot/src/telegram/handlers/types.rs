//! Handler types and dependencies

use std::sync::Arc;

use postacore::{AppError, Database};
use teloxide::types::User;

use crate::telegram::admin::ChannelBindings;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures of the handler logic, before anything is sent.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type BotResult<T> = Result<T, BotError>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db: Database,
    pub bindings: ChannelBindings,
    pub admin_ids: Arc<[i64]>,
    /// Length of a tariff grant in days
    pub grant_days: i64,
}

impl HandlerDeps {
    pub fn new(db: Database, admin_ids: Vec<i64>, grant_days: i64) -> Self {
        Self {
            db,
            bindings: ChannelBindings::new(),
            admin_ids: admin_ids.into(),
            grant_days,
        }
    }

    pub fn is_admin(&self, telegram_id: i64) -> bool {
        self.admin_ids.contains(&telegram_id)
    }
}

/// The Telegram user behind an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: String,
}

impl Sender {
    pub fn from_user(user: &User) -> Self {
        Self {
            // Telegram user ids fit in 52 bits
            telegram_id: user.id.0 as i64,
            username: user.username.clone(),
            full_name: user.full_name(),
        }
    }
}
