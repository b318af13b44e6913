//! SqliteAlertRecordStore
//! ----------------------
//! SQLite-backed implementation of `AlertRecordStore`. One row per active
//! alert so that alerts survive restarts:
//!
//!  - rows are written before an alert is armed
//!  - rows are deleted once the alert fires or is removed
//!  - on startup every row is loaded and re-armed with its original id
//!
//! The record id doubles as the alert's origin reference.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use corelib::{Alert, AlertId, OriginRef, Pair};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use super::AlertRecordStore;
use crate::error::RecordError;

pub struct SqliteAlertRecordStore {
    pool: SqlitePool,
}

impl SqliteAlertRecordStore {
    /// Wrap an existing pool and make sure the schema exists.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, RecordError> {
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Open (creating if missing) the database at `url`.
    pub async fn connect(url: &str) -> Result<Self, RecordError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        info!(%url, "Alert record database opened");
        Self::from_pool(pool).await
    }

    async fn ensure_schema(&self) -> Result<(), RecordError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS alerts (
                alert_id TEXT PRIMARY KEY,
                base TEXT NOT NULL,
                quote TEXT NOT NULL,
                alert_price REAL NOT NULL,
                created_at TEXT NOT NULL
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn decode(row: &SqliteRow) -> Result<Alert, RecordError> {
        let id_str: String = row.try_get("alert_id")?;
        let corrupt = |reason: String| RecordError::CorruptRow {
            id: id_str.clone(),
            reason,
        };

        let id = AlertId::from_str(&id_str).map_err(|e| corrupt(e.to_string()))?;
        let base: String = row.try_get("base")?;
        let quote: String = row.try_get("quote")?;
        let threshold: f64 = row.try_get("alert_price")?;
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(corrupt(format!("threshold {threshold}")));
        }

        let created_at_str: String = row.try_get("created_at")?;
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| corrupt(format!("created_at '{created_at_str}': {e}")))?
            .with_timezone(&Utc);

        Ok(Alert {
            id,
            pair: Pair::new(base, quote),
            threshold,
            created_at,
            origin: Some(OriginRef::new(id_str.clone())),
        })
    }
}

#[async_trait]
impl AlertRecordStore for SqliteAlertRecordStore {
    /// Load every persisted alert, oldest first.
    async fn load_all(&self) -> Result<Vec<Alert>, RecordError> {
        let rows = sqlx::query("SELECT * FROM alerts ORDER BY created_at, alert_id")
            .fetch_all(&self.pool)
            .await?;

        let alerts = rows
            .iter()
            .map(Self::decode)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = alerts.len(), "Alert records loaded");
        Ok(alerts)
    }

    /// Insert or replace the row for `alert.id`.
    async fn save(&self, alert: &Alert) -> Result<(), RecordError> {
        sqlx::query(
            r#"
            INSERT INTO alerts (alert_id, base, quote, alert_price, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(alert_id) DO UPDATE SET
                base = excluded.base,
                quote = excluded.quote,
                alert_price = excluded.alert_price,
                created_at = excluded.created_at;
        "#,
        )
        .bind(alert.id.to_string())
        .bind(&alert.pair.base)
        .bind(&alert.pair.quote)
        .bind(alert.threshold)
        .bind(alert.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: AlertId) -> Result<bool, RecordError> {
        let result = sqlx::query("DELETE FROM alerts WHERE alert_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
