use serde::Serialize;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Tariff code, the primary key of the `tariffs` table
///
/// Only the four seeded tiers exist; admins can toggle them but not add new ones.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TariffCode {
    #[default]
    Mini,
    Standard,
    Pro,
    Vip,
}

impl TariffCode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn is_paid(&self) -> bool {
        !matches!(self, TariffCode::Mini)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            TariffCode::Mini => "🆓",
            TariffCode::Standard => "⭐",
            TariffCode::Pro => "🚀",
            TariffCode::Vip => "👑",
        }
    }
}

// rusqlite FromSql: read tariff code from DB text column
impl rusqlite::types::FromSql for TariffCode {
    fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
        let s = value.as_str()?;
        TariffCode::from_str(s).map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
    }
}

// rusqlite ToSql: write tariff code as text to DB
impl rusqlite::types::ToSql for TariffCode {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        Ok(rusqlite::types::ToSqlOutput::Borrowed(rusqlite::types::ValueRef::Text(
            self.as_str().as_bytes(),
        )))
    }
}
