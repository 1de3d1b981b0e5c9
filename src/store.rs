//! Durable append-only alert log backed by SQLite.
//!
//! Alerts are immutable history: the store exposes append and newest-first
//! listing, nothing else. Keywords are persisted as JSON so a round trip
//! reproduces the list exactly.

use crate::core::{Alert, AlertStore, NewAlert};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt alert row: {0}")]
    Corrupt(String),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS alerts (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at       TEXT NOT NULL,
    domain           TEXT NOT NULL,
    similar_to       TEXT NOT NULL,
    similarity_score INTEGER NOT NULL,
    creation_date    TEXT NOT NULL,
    status           TEXT NOT NULL,
    keywords_found   TEXT NOT NULL,
    screenshot_path  TEXT,
    reputation       TEXT NOT NULL
)
"#;

/// SQLite-backed [`AlertStore`].
///
/// The pool is capped at a single connection, making the append path a
/// single-writer by construction.
pub struct SqliteAlertStore {
    pool: SqlitePool,
}

impl SqliteAlertStore {
    /// Opens (and if necessary creates) the database at `database_url` and
    /// applies the schema.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        info!(database_url, "alert store ready");
        Ok(Self { pool })
    }

    /// In-memory store for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }
}

#[async_trait]
impl AlertStore for SqliteAlertStore {
    async fn record(&self, alert: &NewAlert) -> Result<Alert, StoreError> {
        // Rows store microsecond precision; the returned alert must carry
        // the same timestamp a later read produces.
        let created_at = Utc::now();
        let created_at = created_at
            .with_nanosecond(created_at.nanosecond() / 1_000 * 1_000)
            .unwrap_or(created_at);
        let keywords_json = serde_json::to_string(&alert.keywords_found)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let result = sqlx::query(
            "INSERT INTO alerts (created_at, domain, similar_to, similarity_score, \
             creation_date, status, keywords_found, screenshot_path, reputation) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(&alert.domain)
        .bind(&alert.similar_to)
        .bind(alert.similarity_score as i64)
        .bind(&alert.creation_date)
        .bind(alert.status.as_str())
        .bind(&keywords_json)
        .bind(&alert.screenshot_path)
        .bind(alert.reputation.as_str())
        .execute(&self.pool)
        .await?;

        Ok(Alert {
            id: result.last_insert_rowid(),
            created_at,
            domain: alert.domain.clone(),
            similar_to: alert.similar_to.clone(),
            similarity_score: alert.similarity_score,
            creation_date: alert.creation_date.clone(),
            status: alert.status,
            keywords_found: alert.keywords_found.clone(),
            screenshot_path: alert.screenshot_path.clone(),
            reputation: alert.reputation,
        })
    }

    async fn list_all(&self) -> Result<Vec<Alert>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, created_at, domain, similar_to, similarity_score, creation_date, \
             status, keywords_found, screenshot_path, reputation \
             FROM alerts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let created_at: String = row.try_get("created_at")?;
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map_err(|e| StoreError::Corrupt(e.to_string()))?
                    .with_timezone(&Utc);

                let score: i64 = row.try_get("similarity_score")?;
                let similarity_score = u8::try_from(score)
                    .map_err(|_| StoreError::Corrupt(format!("similarity score {score}")))?;

                let status: String = row.try_get("status")?;
                let reputation: String = row.try_get("reputation")?;
                let keywords_json: String = row.try_get("keywords_found")?;

                Ok(Alert {
                    id: row.try_get("id")?,
                    created_at,
                    domain: row.try_get("domain")?,
                    similar_to: row.try_get("similar_to")?,
                    similarity_score,
                    creation_date: row.try_get("creation_date")?,
                    status: status
                        .parse()
                        .map_err(|e: anyhow::Error| StoreError::Corrupt(e.to_string()))?,
                    keywords_found: serde_json::from_str(&keywords_json)
                        .map_err(|e| StoreError::Corrupt(e.to_string()))?,
                    screenshot_path: row.try_get("screenshot_path")?,
                    reputation: reputation
                        .parse()
                        .map_err(|e: anyhow::Error| StoreError::Corrupt(e.to_string()))?,
                })
            })
            .collect()
    }
}
