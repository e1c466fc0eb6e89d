//! Persistence gateway: connection pool, migrations and every query

pub mod db;
pub mod migrations;
pub mod models;
pub mod payments;
pub mod tariffs;
pub mod usage;
pub mod users;

// Re-exports for convenience
pub use db::{Database, DbConnection, DbPool, PoolSettings};
pub use models::{
    ApprovalOutcome, CryptoPayment, PendingPayment, RejectionOutcome, ScheduledPost, Subscription, Tariff,
    TariffChannel, Usage, User, UserChannel,
};
