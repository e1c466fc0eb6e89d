use rusqlite::Connection;
use std::sync::{Mutex, OnceLock};

use crate::core::config;
use crate::core::error::AppResult;

mod embedded {
    use refinery::embed_migrations;

    embed_migrations!("./migrations");
}

static MIGRATION_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Applies every embedded migration that has not run yet.
///
/// The DDL itself is `CREATE ... IF NOT EXISTS`, and refinery records applied
/// versions, so calling this on every startup is safe.
pub fn run_migrations(conn: &mut Connection) -> AppResult<()> {
    // Serialize migrations per-process so two pools opened at once do not
    // interleave on the same file.
    let mutex = MIGRATION_LOCK.get_or_init(|| Mutex::new(()));
    // Migrations are idempotent, so a poisoned lock is safe to reuse
    let _guard = match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("Migration lock was poisoned, recovering...");
            poisoned.into_inner()
        }
    };

    conn.busy_timeout(config::pool::busy_timeout())?;

    let report = embedded::migrations::runner().run(conn)?;
    for migration in report.applied_migrations() {
        log::info!("Applied migration {}", migration);
    }
    Ok(())
}
