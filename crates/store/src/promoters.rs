//! Promoter account persistence.

use chrono::Utc;
use copiloto_core::error::StoreError;
use copiloto_core::Promoter;
use sqlx::Row;

use crate::{parse_timestamp, Store};

/// Input for creating a promoter account.
#[derive(Debug, Clone)]
pub struct NewPromoter {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub zona: Option<String>,
}

impl Store {
    /// Insert a promoter account. The email must not already exist.
    pub async fn create_promoter(&self, new: NewPromoter) -> Result<Promoter, StoreError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, name, role, zona, clientes_activos, is_active, created_at)
            VALUES (?1, ?2, ?3, 'promotor', ?4, 0, 1, ?5)
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.name)
        .bind(&new.zona)
        .bind(created_at.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT user failed: {e}")))?;

        Ok(Promoter {
            id: result.last_insert_rowid(),
            email: new.email,
            password_hash: new.password_hash,
            name: new.name,
            role: "promotor".into(),
            zona: new.zona,
            clientes_activos: 0,
            is_active: true,
            created_at,
        })
    }

    /// Look up a promoter by email (login path).
    pub async fn find_promoter_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Promoter>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::QueryFailed(format!("user by email: {e}")))?;

        row.as_ref().map(row_to_promoter).transpose()
    }

    /// Look up a promoter by id.
    pub async fn find_promoter(&self, id: i64) -> Result<Option<Promoter>, StoreError> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::QueryFailed(format!("user by id: {e}")))?;

        row.as_ref().map(row_to_promoter).transpose()
    }

    /// Overwrite the cached active-client counter.
    pub async fn set_active_client_count(
        &self,
        promoter_id: i64,
        count: i64,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET clientes_activos = ?1 WHERE id = ?2")
            .bind(count)
            .bind(promoter_id)
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::Storage(format!("UPDATE counter failed: {e}")))?;
        Ok(())
    }
}

fn row_to_promoter(row: &sqlx::sqlite::SqliteRow) -> Result<Promoter, StoreError> {
    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
    let is_active: i64 = row
        .try_get("is_active")
        .map_err(|e| StoreError::QueryFailed(format!("is_active column: {e}")))?;

    Ok(Promoter {
        id: row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?,
        email: row
            .try_get("email")
            .map_err(|e| StoreError::QueryFailed(format!("email column: {e}")))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| StoreError::QueryFailed(format!("password_hash column: {e}")))?,
        name: row
            .try_get("name")
            .map_err(|e| StoreError::QueryFailed(format!("name column: {e}")))?,
        role: row
            .try_get("role")
            .map_err(|e| StoreError::QueryFailed(format!("role column: {e}")))?,
        zona: row
            .try_get("zona")
            .map_err(|e| StoreError::QueryFailed(format!("zona column: {e}")))?,
        clientes_activos: row
            .try_get("clientes_activos")
            .map_err(|e| StoreError::QueryFailed(format!("clientes_activos column: {e}")))?,
        is_active: is_active != 0,
        created_at: parse_timestamp(&created_at_str),
    })
}
