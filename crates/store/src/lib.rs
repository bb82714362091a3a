//! SQLite persistence for Copiloto.
//!
//! One database file, four tables:
//! - `users`   — promoter accounts
//! - `clients` — client records, promoter-scoped
//! - `threads` — conversation threads, promoter-scoped
//! - `turns`   — immutable messages within a thread
//!
//! Foreign keys are ON; deleting a thread cascades to its turns. All
//! timestamps are stored as RFC 3339 TEXT.

mod clients;
mod promoters;
mod threads;

pub use clients::{ClientPatch, NewClient};
pub use promoters::NewPromoter;

use chrono::{DateTime, Utc};
use copiloto_core::error::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::{debug, info};

/// The persistence store, a thin wrapper over a SQLite pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) the database at the given path.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database
    /// (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run schema migrations — creates tables and indexes.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                email            TEXT UNIQUE NOT NULL,
                password_hash    TEXT NOT NULL,
                name             TEXT NOT NULL,
                role             TEXT NOT NULL DEFAULT 'promotor',
                zona             TEXT,
                clientes_activos INTEGER NOT NULL DEFAULT 0,
                is_active        INTEGER NOT NULL DEFAULT 1,
                created_at       TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("users table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                promotor_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name          TEXT NOT NULL,
                email         TEXT,
                phone         TEXT,
                business_name TEXT,
                business_type TEXT,
                status        TEXT NOT NULL DEFAULT 'prospecto',
                notes         TEXT,
                created_at    TEXT NOT NULL,
                last_contact  TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("clients table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS threads (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title      TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("threads table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id  INTEGER NOT NULL REFERENCES threads(id) ON DELETE CASCADE,
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("turns table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_clients_promotor ON clients(promotor_id, status)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("clients index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_threads_user ON threads(user_id, updated_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("threads index: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_turns_thread ON turns(thread_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::MigrationFailed(format!("turns index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }
}

/// Parse a stored RFC 3339 timestamp, defaulting to now on corrupt rows.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let store = test_support::test_store().await;
        store.run_migrations().await.unwrap();
        store.run_migrations().await.unwrap();
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_now() {
        let parsed = parse_timestamp("not-a-date");
        assert!(parsed <= Utc::now());
    }
}
