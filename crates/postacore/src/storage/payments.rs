//! Manual crypto payments: user claims, admin approval and rejection

use chrono::Utc;
use rusqlite::{params, OptionalExtension, TransactionBehavior};

use super::db::Database;
use super::models::{ApprovalOutcome, CryptoPayment, PendingPayment, RejectionOutcome};
use super::users::grant_tariff;
use crate::core::error::AppResult;
use crate::core::types::TariffCode;

impl Database {
    /// Records a user's claim that they paid for `tariff` in crypto.
    ///
    /// The amount is copied from the tariff's crypto price by the INSERT
    /// itself, so a later price change does not alter recorded claims.
    pub fn record_crypto_payment(
        &self,
        user_id: i64,
        tariff: TariffCode,
        check_id: Option<&str>,
    ) -> AppResult<CryptoPayment> {
        let conn = self.connection()?;
        let payment = conn.query_row(
            &format!(
                "INSERT INTO crypto_payments (user_id, tariff_code, amount, check_id, created_at)
                 VALUES (?1, ?2, (SELECT crypto_price FROM tariffs WHERE code = ?2), ?3, ?4)
                 RETURNING {}",
                CryptoPayment::COLUMNS
            ),
            params![user_id, tariff, check_id, Utc::now()],
            CryptoPayment::from_row,
        )?;

        log::info!(
            "Recorded crypto payment #{} user_id={} tariff={} amount={:?}",
            payment.id,
            user_id,
            tariff,
            payment.amount
        );
        Ok(payment)
    }

    pub fn crypto_payment(&self, payment_id: i64) -> AppResult<Option<CryptoPayment>> {
        let conn = self.connection()?;
        let payment = conn
            .query_row(
                &format!("SELECT {} FROM crypto_payments WHERE id = ?1", CryptoPayment::COLUMNS),
                [payment_id],
                CryptoPayment::from_row,
            )
            .optional()?;
        Ok(payment)
    }

    /// Payments neither confirmed nor rejected, oldest first.
    pub fn pending_crypto_payments(&self) -> AppResult<Vec<PendingPayment>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT cp.id, cp.user_id, cp.tariff_code, cp.amount, cp.check_id, cp.confirmed, cp.rejected,
                    cp.created_at, u.telegram_id
             FROM crypto_payments cp
             JOIN users u ON u.id = cp.user_id
             WHERE cp.confirmed = 0 AND cp.rejected = 0
             ORDER BY cp.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(PendingPayment {
                payment: CryptoPayment::from_row(row)?,
                telegram_id: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Confirms a pending payment and grants its tariff for `days` days.
    ///
    /// The confirm flip is conditional on the payment still being pending, and
    /// the grant only runs when that flip changed a row, all in a single
    /// transaction. Approving the same payment twice therefore grants once.
    pub fn approve_crypto_payment(&self, payment_id: i64, days: i64) -> AppResult<ApprovalOutcome> {
        let mut conn = self.connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let flipped = tx
            .query_row(
                "UPDATE crypto_payments SET confirmed = 1
                 WHERE id = ?1 AND confirmed = 0 AND rejected = 0
                 RETURNING user_id, tariff_code",
                [payment_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, TariffCode>(1)?)),
            )
            .optional()?;

        let Some((user_id, tariff_code)) = flipped else {
            let exists = tx
                .query_row("SELECT 1 FROM crypto_payments WHERE id = ?1", [payment_id], |_| Ok(()))
                .optional()?
                .is_some();
            tx.commit()?;
            if exists {
                log::warn!("Crypto payment #{} already processed, not granting again", payment_id);
                return Ok(ApprovalOutcome::AlreadyProcessed);
            }
            return Ok(ApprovalOutcome::NotFound);
        };

        let subscribed_until = grant_tariff(&tx, user_id, tariff_code, days)?;
        let telegram_id: i64 = tx.query_row("SELECT telegram_id FROM users WHERE id = ?1", [user_id], |row| row.get(0))?;
        tx.commit()?;

        log::info!(
            "Approved crypto payment #{}: tariff {} granted to user_id={} until {}",
            payment_id,
            tariff_code,
            user_id,
            subscribed_until
        );
        Ok(ApprovalOutcome::Approved {
            user_id,
            telegram_id,
            tariff_code,
            subscribed_until,
        })
    }

    /// Marks a pending payment as rejected. Confirmed payments stay confirmed.
    pub fn reject_crypto_payment(&self, payment_id: i64) -> AppResult<RejectionOutcome> {
        let conn = self.connection()?;
        let rejected = conn
            .query_row(
                "UPDATE crypto_payments SET rejected = 1
                 WHERE id = ?1 AND confirmed = 0 AND rejected = 0
                 RETURNING user_id",
                [payment_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        if let Some(user_id) = rejected {
            let telegram_id: i64 =
                conn.query_row("SELECT telegram_id FROM users WHERE id = ?1", [user_id], |row| row.get(0))?;
            log::info!("Rejected crypto payment #{}", payment_id);
            return Ok(RejectionOutcome::Rejected { telegram_id });
        }

        let exists = self.crypto_payment(payment_id)?.is_some();
        Ok(if exists {
            RejectionOutcome::AlreadyProcessed
        } else {
            RejectionOutcome::NotFound
        })
    }
}
