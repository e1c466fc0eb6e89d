use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};

use crate::core::config;
use crate::core::error::AppResult;
use crate::core::types::TariffCode;
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Pool sizing. Defaults come from [`config::pool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub min_idle: u32,
    pub max_size: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_idle: config::pool::MIN_IDLE,
            max_size: config::pool::MAX_SIZE,
        }
    }
}

/// Seed row for the `tariffs` table: code, channels limit, posts per day,
/// Stars price, crypto price.
struct TariffSeed(TariffCode, i64, i64, i64, Option<f64>);

const DEFAULT_TARIFFS: [TariffSeed; 4] = [
    TariffSeed(TariffCode::Mini, 1, 3, 0, None),
    TariffSeed(TariffCode::Standard, 2, 8, 300, None),
    TariffSeed(TariffCode::Pro, 3, 12, 500, Some(4.0)),
    TariffSeed(TariffCode::Vip, 8, 32, 800, Some(6.5)),
];

/// Persistence gateway: owns the connection pool and exposes every query the
/// bot needs.
///
/// Constructed explicitly with [`Database::open`] and handed to the handlers;
/// there is no process-wide instance. Each operation checks a connection out
/// of the pool for its own duration only.
///
/// # Example
///
/// ```no_run
/// use postacore::storage::Database;
///
/// let db = Database::open("postabot.sqlite")?;
/// let user = db.get_or_create_user(555, Some("alice"), Some("Alice A"))?;
/// assert_eq!(user.tariff_code.as_str(), "MINI");
/// db.close();
/// # Ok::<(), postacore::core::AppError>(())
/// ```
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Opens the pool with default sizing (5 idle / 20 max) and bootstraps
    /// schema and seed data.
    pub fn open(database_path: &str) -> AppResult<Self> {
        Self::open_with(database_path, PoolSettings::default())
    }

    pub fn open_with(database_path: &str, settings: PoolSettings) -> AppResult<Self> {
        let manager = SqliteConnectionManager::file(database_path).with_init(|conn| {
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.busy_timeout(config::pool::busy_timeout())
        });
        let pool = Pool::builder()
            .min_idle(Some(settings.min_idle))
            .max_size(settings.max_size)
            .connection_timeout(config::pool::connection_timeout())
            .build(manager)?;

        let db = Self { pool };
        db.bootstrap()?;
        log::info!(
            "Database connected: {} (pool {}..{})",
            database_path,
            settings.min_idle,
            settings.max_size
        );
        Ok(db)
    }

    /// Creates missing tables and inserts the default tariffs.
    ///
    /// Existing tariff rows are never overwritten, so prices or active flags
    /// changed by an admin survive restarts.
    pub fn bootstrap(&self) -> AppResult<()> {
        let mut conn = self.connection()?;
        run_migrations(&mut conn)?;
        seed_tariffs(&conn)?;
        Ok(())
    }

    /// Checks a connection out of the pool. It returns to the pool on drop.
    pub fn connection(&self) -> AppResult<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Releases the pool. Connections still checked out close when their
    /// holders drop them.
    pub fn close(self) {
        let state = self.pool.state();
        log::info!(
            "Closing database pool ({} connections, {} idle)",
            state.connections,
            state.idle_connections
        );
        drop(self.pool);
    }
}

fn seed_tariffs(conn: &Connection) -> AppResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO tariffs (code, name, channels_limit, posts_per_day, stars_price, crypto_price)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (code) DO NOTHING",
    )?;

    let mut inserted = 0;
    for TariffSeed(code, channels_limit, posts_per_day, stars_price, crypto_price) in &DEFAULT_TARIFFS {
        inserted += stmt.execute(params![
            code,
            code.as_str(),
            channels_limit,
            posts_per_day,
            stars_price,
            crypto_price
        ])?;
    }

    if inserted > 0 {
        log::info!("Seeded {} default tariff(s)", inserted);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_temp() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let settings = PoolSettings { min_idle: 1, max_size: 4 };
        let db = Database::open_with(path.to_str().unwrap(), settings).unwrap();
        (dir, db)
    }

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let rows = stmt.query_map([], |row| row.get::<_, String>(0)).unwrap();
        rows.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_open_creates_all_tables() {
        let (_dir, db) = open_temp();
        let conn = db.connection().unwrap();
        let tables = table_names(&conn);

        for table in [
            "crypto_payments",
            "scheduled_posts",
            "subscriptions",
            "tariff_channels",
            "tariffs",
            "user_channels",
            "users",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
    }

    #[test]
    fn test_foreign_keys_enabled_on_pooled_connections() {
        let (_dir, db) = open_temp();
        let conn = db.connection().unwrap();
        let enabled: bool = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert!(enabled);
    }

    #[test]
    fn test_default_pool_settings() {
        assert_eq!(PoolSettings::default(), PoolSettings { min_idle: 5, max_size: 20 });
    }

    #[test]
    fn test_close_releases_pool() {
        let (_dir, db) = open_temp();
        let clone = db.clone();
        db.close();
        // The clone keeps its own handle on the shared pool
        assert!(clone.connection().is_ok());
        clone.close();
    }
}
