//! Postacore - storage and domain layer of the Postabot autoposting bot
//!
//! Everything here is free of Telegram: tariffs, users, subscriptions and
//! manual crypto payments, persisted in SQLite behind a connection pool.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, logging and domain types
//! - `storage`: The [`Database`] gateway, migrations and typed records

pub mod core;
pub mod storage;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, TariffCode};
pub use storage::{ApprovalOutcome, Database, PoolSettings, RejectionOutcome};
