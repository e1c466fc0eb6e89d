use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

/// Database file path
/// Read from DATABASE_PATH environment variable
/// Default: postabot.sqlite
pub static DATABASE_PATH: Lazy<String> =
    Lazy::new(|| env::var("DATABASE_PATH").unwrap_or_else(|_| "postabot.sqlite".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: postabot.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "postabot.log".to_string()));

/// Bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Custom Bot API server URL (local telegram-bot-api), if any
pub static BOT_API_URL: Lazy<Option<String>> = Lazy::new(|| {
    env::var("BOT_API_URL")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
});

/// Connection pool configuration
pub mod pool {
    use super::Duration;

    /// Connections kept open even when idle
    pub const MIN_IDLE: u32 = 5;

    /// Hard upper bound on open connections
    pub const MAX_SIZE: u32 = 20;

    /// How long a handler waits for a free connection (in seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;

    /// SQLite busy timeout for writers contending on the same file (in seconds)
    pub const BUSY_TIMEOUT_SECS: u64 = 5;

    pub fn connection_timeout() -> Duration {
        Duration::from_secs(CONNECTION_TIMEOUT_SECS)
    }

    pub fn busy_timeout() -> Duration {
        Duration::from_secs(BUSY_TIMEOUT_SECS)
    }
}

/// Subscription configuration
pub mod subscription {
    use once_cell::sync::Lazy;
    use std::env;

    /// Length of a tariff grant when SUBSCRIPTION_DAYS is not set
    pub const DEFAULT_DAYS: i64 = 30;

    /// How long a freeze lasts
    pub const FREEZE_DAYS: i64 = 7;

    /// Longest grant or freeze the gateway accepts (10 years)
    pub const MAX_DAYS: i64 = 3650;

    /// Accepts SUBSCRIPTION_DAYS values in `1..=MAX_DAYS`
    pub fn parse_grant_days(raw: &str) -> Option<i64> {
        raw.trim().parse::<i64>().ok().filter(|days| (1..=MAX_DAYS).contains(days))
    }

    /// Length of a tariff grant (in days)
    /// Read from SUBSCRIPTION_DAYS environment variable
    pub static GRANT_DAYS: Lazy<i64> = Lazy::new(|| {
        env::var("SUBSCRIPTION_DAYS")
            .ok()
            .and_then(|raw| parse_grant_days(&raw))
            .unwrap_or(DEFAULT_DAYS)
    });
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Admin configuration
pub mod admin {
    use once_cell::sync::Lazy;
    use std::env;

    pub fn parse_admin_ids(raw: &str) -> Vec<i64> {
        raw.split([',', ' ', '\n', '\t'])
            .filter_map(|part| part.trim().parse::<i64>().ok())
            .collect()
    }

    /// Admin user IDs (comma-separated)
    /// Read from ADMIN_IDS environment variable
    pub static ADMIN_IDS: Lazy<Vec<i64>> = Lazy::new(|| {
        env::var("ADMIN_IDS")
            .ok()
            .map(|raw| parse_admin_ids(&raw))
            .unwrap_or_default()
    });
}
