//! Users, tariff grants and the subscription history

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::db::Database;
use super::models::{Subscription, User};
use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::types::TariffCode;

impl Database {
    /// Returns the user with this Telegram id, creating it on first contact.
    ///
    /// New users start on [`TariffCode::Mini`]. Existing rows are returned
    /// unchanged; username and name are not refreshed.
    pub fn get_or_create_user(
        &self,
        telegram_id: i64,
        username: Option<&str>,
        full_name: Option<&str>,
    ) -> AppResult<User> {
        let conn = self.connection()?;
        let now = Utc::now();

        let created = conn.execute(
            "INSERT INTO users (telegram_id, username, full_name, tariff_code, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (telegram_id) DO NOTHING",
            params![telegram_id, username, full_name, TariffCode::default(), now],
        )?;
        if created > 0 {
            log::info!("Created user telegram_id={} username={:?}", telegram_id, username);
        }

        let user = conn.query_row(
            &format!("SELECT {} FROM users WHERE telegram_id = ?1", User::COLUMNS),
            [telegram_id],
            User::from_row,
        )?;
        Ok(user)
    }

    pub fn user_by_telegram_id(&self, telegram_id: i64) -> AppResult<Option<User>> {
        let conn = self.connection()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE telegram_id = ?1", User::COLUMNS),
                [telegram_id],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        let conn = self.connection()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
                [user_id],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Grants `tariff` to the user for `days` days starting now.
    ///
    /// Updates the user's current tariff/expiry (and unfreezes them) and
    /// appends a subscription row with the same end timestamp, both inside
    /// one transaction. Returns the new expiry.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] when `days` is outside
    /// `1..=`[`config::subscription::MAX_DAYS`], [`AppError::NotFound`] when
    /// the user does not exist. Nothing is written in either case.
    pub fn set_tariff(&self, user_id: i64, tariff: TariffCode, days: i64) -> AppResult<DateTime<Utc>> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let until = grant_tariff(&tx, user_id, tariff, days)?;
        tx.commit()?;

        log::info!("Granted tariff {} to user_id={} until {}", tariff, user_id, until);
        Ok(until)
    }

    /// Freezes the user for [`config::subscription::FREEZE_DAYS`] days.
    ///
    /// Nothing reads the frozen flag yet; it is cleared by the next tariff grant.
    pub fn freeze_user(&self, user_id: i64) -> AppResult<DateTime<Utc>> {
        let conn = self.connection()?;
        let now = Utc::now();
        let until = expiry_after(now, config::subscription::FREEZE_DAYS)?;

        conn.execute(
            "UPDATE users SET is_frozen = 1, frozen_until = ?1, updated_at = ?2 WHERE id = ?3",
            params![until, now, user_id],
        )?;
        log::info!("Froze user_id={} until {}", user_id, until);
        Ok(until)
    }

    /// Subscription history, newest grant first.
    pub fn subscriptions_for_user(&self, user_id: i64) -> AppResult<Vec<Subscription>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, tariff_code, started_at, ends_at, active
             FROM subscriptions WHERE user_id = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([user_id], Subscription::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// `now + days`, for grant and freeze lengths in `1..=MAX_DAYS`.
pub(crate) fn expiry_after(now: DateTime<Utc>, days: i64) -> AppResult<DateTime<Utc>> {
    if !(1..=config::subscription::MAX_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "duration must be 1..={} days, got {}",
            config::subscription::MAX_DAYS,
            days
        )));
    }
    Duration::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or_else(|| AppError::Validation(format!("{} days from {} is out of range", days, now)))
}

/// The two writes of a tariff grant, run on the caller's transaction.
pub(crate) fn grant_tariff(conn: &Connection, user_id: i64, tariff: TariffCode, days: i64) -> AppResult<DateTime<Utc>> {
    let now = Utc::now();
    let until = expiry_after(now, days)?;

    let updated = conn.execute(
        "UPDATE users SET tariff_code = ?1, subscribed_until = ?2, is_frozen = 0, updated_at = ?3 WHERE id = ?4",
        params![tariff, until, now, user_id],
    )?;
    if updated == 0 {
        return Err(AppError::NotFound(format!("user_id={}", user_id)));
    }
    conn.execute(
        "INSERT INTO subscriptions (user_id, tariff_code, started_at, ends_at) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, tariff, now, until],
    )?;

    Ok(until)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::PoolSettings;
    use pretty_assertions::assert_eq;

    fn open_temp() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.sqlite");
        let db = Database::open_with(path.to_str().unwrap(), PoolSettings { min_idle: 1, max_size: 4 }).unwrap();
        (dir, db)
    }

    fn subscription_count(db: &Database, user_id: i64) -> i64 {
        let conn = db.connection().unwrap();
        conn.query_row("SELECT COUNT(*) FROM subscriptions WHERE user_id = ?1", [user_id], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_get_or_create_user_new_user_starts_on_mini() {
        let (_dir, db) = open_temp();

        let user = db.get_or_create_user(555, Some("alice"), Some("Alice A")).unwrap();

        assert_eq!(user.telegram_id, 555);
        assert_eq!(user.username.as_deref(), Some("alice"));
        assert_eq!(user.full_name.as_deref(), Some("Alice A"));
        assert_eq!(user.tariff_code, TariffCode::Mini);
        assert_eq!(user.subscribed_until, None);
        assert!(!user.is_frozen);
    }

    #[test]
    fn test_get_or_create_user_is_idempotent() {
        let (_dir, db) = open_temp();

        let first = db.get_or_create_user(555, Some("alice"), Some("Alice A")).unwrap();
        let second = db.get_or_create_user(555, Some("renamed"), None).unwrap();

        assert_eq!(first, second);
        let conn = db.connection().unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM users WHERE telegram_id = 555", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_user_lookups() {
        let (_dir, db) = open_temp();
        let user = db.get_or_create_user(42, None, None).unwrap();

        assert_eq!(db.user_by_telegram_id(42).unwrap(), Some(user.clone()));
        assert_eq!(db.user_by_id(user.id).unwrap(), Some(user));
        assert_eq!(db.user_by_telegram_id(43).unwrap(), None);
        assert_eq!(db.user_by_id(9999).unwrap(), None);
    }

    #[test]
    fn test_set_tariff_updates_user_and_appends_history() {
        let (_dir, db) = open_temp();
        let user = db.get_or_create_user(1, None, None).unwrap();
        let before = Utc::now();

        let until = db.set_tariff(user.id, TariffCode::Pro, 30).unwrap();

        assert!(until >= before + Duration::days(30));
        assert!(until <= Utc::now() + Duration::days(30));

        let updated = db.user_by_id(user.id).unwrap().unwrap();
        assert_eq!(updated.tariff_code, TariffCode::Pro);
        assert_eq!(updated.subscribed_until, Some(until));

        let history = db.subscriptions_for_user(user.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].tariff_code, TariffCode::Pro);
        assert_eq!(history[0].ends_at, until);
        assert!(history[0].active);
    }

    #[test]
    fn test_set_tariff_twice_appends_two_rows() {
        let (_dir, db) = open_temp();
        let user = db.get_or_create_user(1, None, None).unwrap();

        db.set_tariff(user.id, TariffCode::Standard, 30).unwrap();
        let until = db.set_tariff(user.id, TariffCode::Vip, 7).unwrap();

        assert_eq!(subscription_count(&db, user.id), 2);
        let history = db.subscriptions_for_user(user.id).unwrap();
        assert_eq!(history[0].tariff_code, TariffCode::Vip);
        assert_eq!(history[0].ends_at, until);
        assert_eq!(db.user_by_id(user.id).unwrap().unwrap().tariff_code, TariffCode::Vip);
    }

    #[test]
    fn test_set_tariff_unknown_user_rolls_back() {
        let (_dir, db) = open_temp();

        let err = db.set_tariff(777, TariffCode::Pro, 30).unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)), "unexpected error: {err}");
        assert_eq!(subscription_count(&db, 777), 0);
    }

    #[test]
    fn test_set_tariff_rejects_out_of_range_days() {
        let (_dir, db) = open_temp();
        let user = db.get_or_create_user(1, None, None).unwrap();

        for days in [0, -5, config::subscription::MAX_DAYS + 1, 200_000_000, i64::MAX] {
            let err = db.set_tariff(user.id, TariffCode::Pro, days).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{days}: unexpected error: {err}");
        }

        let unchanged = db.user_by_id(user.id).unwrap().unwrap();
        assert_eq!(unchanged.tariff_code, TariffCode::Mini);
        assert_eq!(unchanged.subscribed_until, None);
        assert_eq!(subscription_count(&db, user.id), 0);
    }

    #[test]
    fn test_set_tariff_accepts_longest_grant() {
        let (_dir, db) = open_temp();
        let user = db.get_or_create_user(1, None, None).unwrap();

        let until = db
            .set_tariff(user.id, TariffCode::Vip, config::subscription::MAX_DAYS)
            .unwrap();

        assert!(until > Utc::now() + Duration::days(config::subscription::MAX_DAYS - 1));
    }

    #[test]
    fn test_set_tariff_clears_freeze() {
        let (_dir, db) = open_temp();
        let user = db.get_or_create_user(1, None, None).unwrap();

        let frozen_until = db.freeze_user(user.id).unwrap();
        let frozen = db.user_by_id(user.id).unwrap().unwrap();
        assert!(frozen.is_frozen);
        assert_eq!(frozen.frozen_until, Some(frozen_until));
        assert!(frozen_until > Utc::now() + Duration::days(6));

        db.set_tariff(user.id, TariffCode::Standard, 30).unwrap();
        assert!(!db.user_by_id(user.id).unwrap().unwrap().is_frozen);
    }
}
