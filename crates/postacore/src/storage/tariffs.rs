//! Tariffs and their private channels

use rusqlite::{params, OptionalExtension};

use super::db::Database;
use super::models::{Tariff, TariffChannel};
use crate::core::error::{AppError, AppResult};
use crate::core::types::TariffCode;

impl Database {
    /// Tariffs shown to users: active only, cheapest first.
    pub fn active_tariffs(&self) -> AppResult<Vec<Tariff>> {
        self.query_tariffs("WHERE is_active = 1")
    }

    /// Every tariff regardless of the active flag, cheapest first.
    pub fn all_tariffs(&self) -> AppResult<Vec<Tariff>> {
        self.query_tariffs("")
    }

    fn query_tariffs(&self, filter: &str) -> AppResult<Vec<Tariff>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tariffs {} ORDER BY stars_price, code",
            Tariff::COLUMNS,
            filter
        ))?;
        let rows = stmt.query_map([], Tariff::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn tariff(&self, code: TariffCode) -> AppResult<Option<Tariff>> {
        let conn = self.connection()?;
        let tariff = conn
            .query_row(
                &format!("SELECT {} FROM tariffs WHERE code = ?1", Tariff::COLUMNS),
                [code],
                Tariff::from_row,
            )
            .optional()?;
        Ok(tariff)
    }

    /// Flips the active flag. Returns the new value, or `None` if no such row.
    pub fn toggle_tariff(&self, code: TariffCode) -> AppResult<Option<bool>> {
        let conn = self.connection()?;
        let is_active = conn
            .query_row(
                "UPDATE tariffs SET is_active = NOT is_active WHERE code = ?1 RETURNING is_active",
                [code],
                |row| row.get::<_, bool>(0),
            )
            .optional()?;

        if let Some(active) = is_active {
            log::info!("Tariff {} is now {}", code, if active { "active" } else { "inactive" });
        }
        Ok(is_active)
    }

    pub fn tariff_channel(&self, code: TariffCode) -> AppResult<Option<TariffChannel>> {
        let conn = self.connection()?;
        let channel = conn
            .query_row(
                "SELECT tariff_code, channel_id, invite_link FROM tariff_channels WHERE tariff_code = ?1",
                [code],
                TariffChannel::from_row,
            )
            .optional()?;
        Ok(channel)
    }

    /// Binds (or rebinds) the private channel of a tariff.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty invite link; a channel already bound to a
    /// different tariff violates the UNIQUE constraint and is returned as is.
    pub fn bind_tariff_channel(&self, code: TariffCode, channel_id: i64, invite_link: &str) -> AppResult<TariffChannel> {
        let invite_link = invite_link.trim();
        if invite_link.is_empty() {
            return Err(AppError::Validation("invite link is empty".to_string()));
        }

        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO tariff_channels (tariff_code, channel_id, invite_link) VALUES (?1, ?2, ?3)
             ON CONFLICT (tariff_code) DO UPDATE SET channel_id = excluded.channel_id, invite_link = excluded.invite_link",
            params![code, channel_id, invite_link],
        )?;
        log::info!("Bound channel {} to tariff {}", channel_id, code);

        Ok(TariffChannel {
            tariff_code: code,
            channel_id,
            invite_link: invite_link.to_string(),
        })
    }
}
