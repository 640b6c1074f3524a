//! SQLite-backed storage.
//!
//! Each append is wrapped in `BEGIN IMMEDIATE` so two writers racing on
//! the same connection pool fail fast on the write lock rather than
//! interleaving; the real exclusion guarantee still comes from
//! [`crate::locks::SessionLocks`] upstream in `evidentia-ingest` — this
//! is defense in depth, not the primary mechanism.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

use crate::backend::{StorageBackend, StorageError};
use evidentia_model::EventEnvelope;

#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub url: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:evidentia.db?mode=rwc".to_string(),
            max_connections: 5,
            busy_timeout_secs: 30,
        }
    }
}

impl SqliteConfig {
    pub fn memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            busy_timeout_secs: 5,
        }
    }
}

#[derive(Debug)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub async fn new(url: &str) -> Result<Self, StorageError> {
        Self::new_with_config(SqliteConfig { url: url.to_string(), ..Default::default() }).await
    }

    pub async fn new_with_config(config: SqliteConfig) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| StorageError::Connection(e.to_string()))?
            .pragma("foreign_keys", "ON")
            .pragma("busy_timeout", config.busy_timeout_secs.to_string())
            .pragma("journal_mode", "WAL");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS events (
                session_id TEXT NOT NULL,
                sequence_number INTEGER NOT NULL,
                envelope_json TEXT NOT NULL,
                PRIMARY KEY (session_id, sequence_number)
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        tracing::info!(url = %config.url, "connected to sqlite event store");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn is_healthy(&self) -> bool {
        !self.pool.is_closed()
    }

    async fn append_events(&self, session_id: Uuid, events: &[EventEnvelope]) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await.map_err(|e| StorageError::Connection(e.to_string()))?;

        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        for event in events {
            if let Err(e) = insert_one(&mut conn, session_id, event).await {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        }

        sqlx::query("COMMIT").execute(&mut *conn).await.map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn read_events(&self, session_id: Uuid) -> Result<Vec<EventEnvelope>, StorageError> {
        let rows = sqlx::query(
            "SELECT envelope_json FROM events WHERE session_id = ? ORDER BY sequence_number ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let json: String = row.try_get("envelope_json").map_err(|e| StorageError::Query(e.to_string()))?;
                serde_json::from_str(&json).map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect()
    }

    async fn tail_event(&self, session_id: Uuid) -> Result<Option<EventEnvelope>, StorageError> {
        let row = sqlx::query(
            "SELECT envelope_json FROM events WHERE session_id = ? ORDER BY sequence_number DESC LIMIT 1",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let json: String = row.try_get("envelope_json").map_err(|e| StorageError::Query(e.to_string()))?;
                Ok(Some(serde_json::from_str(&json).map_err(|e| StorageError::Serialization(e.to_string()))?))
            }
            None => Ok(None),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<Uuid>, StorageError> {
        let rows = sqlx::query("SELECT DISTINCT session_id FROM events")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let id: String = row.try_get("session_id").map_err(|e| StorageError::Query(e.to_string()))?;
                Uuid::parse_str(&id).map_err(|e| StorageError::Serialization(e.to_string()))
            })
            .collect()
    }
}

async fn insert_one(conn: &mut SqliteConnection, session_id: Uuid, event: &EventEnvelope) -> Result<(), StorageError> {
    let json = serde_json::to_string(event).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let result = sqlx::query("INSERT OR IGNORE INTO events (session_id, sequence_number, envelope_json) VALUES (?, ?, ?)")
        .bind(session_id.to_string())
        .bind(event.sequence_number as i64)
        .bind(json)
        .execute(conn)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

    if result.rows_affected() == 0 {
        return Err(StorageError::SequenceConflict { session_id, sequence_number: event.sequence_number });
    }
    Ok(())
}
