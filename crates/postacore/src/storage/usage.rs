//! Read-only usage figures: channels and scheduled posts

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use rusqlite::{params, OptionalExtension};

use super::db::Database;
use super::models::{ScheduledPost, Usage, UserChannel};
use crate::core::error::AppResult;

const POST_COLUMNS: &str = "id, user_id, channel_id, text, media, scheduled_at, published, is_frozen";

/// Start and end of the UTC day containing `now`.
fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN));
    (start, start + Duration::days(1))
}

impl Database {
    /// Active channels of the user, in the order they were added.
    pub fn user_channels(&self, user_id: i64) -> AppResult<Vec<UserChannel>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, channel_id, title, active FROM user_channels
             WHERE user_id = ?1 AND active = 1 ORDER BY id",
        )?;
        let rows = stmt.query_map([user_id], UserChannel::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn user_channel_count(&self, user_id: i64) -> AppResult<i64> {
        let conn = self.connection()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM user_channels WHERE user_id = ?1 AND active = 1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Posts scheduled within the current UTC day, published or not.
    pub fn posts_scheduled_today(&self, user_id: i64) -> AppResult<i64> {
        self.posts_scheduled_on(user_id, Utc::now())
    }

    fn posts_scheduled_on(&self, user_id: i64, day: DateTime<Utc>) -> AppResult<i64> {
        let (start, end) = utc_day_bounds(day);
        let conn = self.connection()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM scheduled_posts
             WHERE user_id = ?1 AND scheduled_at >= ?2 AND scheduled_at < ?3",
            params![user_id, start, end],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Earliest unpublished post at or after now.
    pub fn next_scheduled_post(&self, user_id: i64) -> AppResult<Option<ScheduledPost>> {
        let conn = self.connection()?;
        let post = conn
            .query_row(
                &format!(
                    "SELECT {} FROM scheduled_posts
                     WHERE user_id = ?1 AND published = 0 AND scheduled_at >= ?2
                     ORDER BY scheduled_at, id LIMIT 1",
                    POST_COLUMNS
                ),
                params![user_id, Utc::now()],
                ScheduledPost::from_row,
            )
            .optional()?;
        Ok(post)
    }

    pub fn usage(&self, user_id: i64) -> AppResult<Usage> {
        Ok(Usage {
            channels: self.user_channels(user_id)?,
            posts_today: self.posts_scheduled_today(user_id)?,
            next_post: self.next_scheduled_post(user_id)?,
        })
    }
}
