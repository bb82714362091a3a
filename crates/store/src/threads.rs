//! Thread and turn persistence.
//!
//! Turns are append-only. `ORDER BY created_at, id` keeps the total order
//! deterministic when two appends land in the same millisecond.

use chrono::Utc;
use copiloto_core::error::StoreError;
use copiloto_core::{Role, Thread, ThreadSummary, Turn};
use sqlx::Row;

use crate::{parse_timestamp, Store};

impl Store {
    /// Create a thread for the given owner.
    pub async fn create_thread(&self, user_id: i64, title: &str) -> Result<Thread, StoreError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO threads (user_id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        )
        .bind(user_id)
        .bind(title)
        .bind(now.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT thread failed: {e}")))?;

        Ok(Thread {
            id: result.last_insert_rowid(),
            user_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Find a thread scoped to its owner.
    pub async fn find_thread(
        &self,
        user_id: i64,
        thread_id: i64,
    ) -> Result<Option<Thread>, StoreError> {
        let row = sqlx::query("SELECT * FROM threads WHERE id = ?1 AND user_id = ?2")
            .bind(thread_id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::QueryFailed(format!("thread by id: {e}")))?;

        row.as_ref().map(row_to_thread).transpose()
    }

    /// List thread summaries for an owner, most recently updated first.
    /// No turn bodies are loaded.
    pub async fn list_threads(&self, user_id: i64) -> Result<Vec<ThreadSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.title, t.updated_at,
                   (SELECT COUNT(*) FROM turns WHERE thread_id = t.id) AS message_count
            FROM threads t
            WHERE t.user_id = ?1
            ORDER BY t.updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await
        .map_err(|e| StoreError::QueryFailed(format!("list threads: {e}")))?;

        rows.iter()
            .map(|row| {
                let updated_at_str: String = row
                    .try_get("updated_at")
                    .map_err(|e| StoreError::QueryFailed(format!("updated_at column: {e}")))?;
                Ok(ThreadSummary {
                    id: row
                        .try_get("id")
                        .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?,
                    title: row
                        .try_get("title")
                        .map_err(|e| StoreError::QueryFailed(format!("title column: {e}")))?,
                    updated_at: parse_timestamp(&updated_at_str),
                    message_count: row.try_get("message_count").map_err(|e| {
                        StoreError::QueryFailed(format!("message_count column: {e}"))
                    })?,
                })
            })
            .collect()
    }

    /// Delete a thread scoped to its owner; turns go with it via the
    /// foreign-key cascade. Returns whether a row went away.
    pub async fn delete_thread(&self, user_id: i64, thread_id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM threads WHERE id = ?1 AND user_id = ?2")
            .bind(thread_id)
            .bind(user_id)
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::Storage(format!("DELETE thread failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Append one turn to a thread and touch the thread's `updated_at`.
    pub async fn append_turn(
        &self,
        thread_id: i64,
        role: Role,
        content: &str,
    ) -> Result<Turn, StoreError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO turns (thread_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(thread_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT turn failed: {e}")))?;

        sqlx::query("UPDATE threads SET updated_at = ?1 WHERE id = ?2")
            .bind(now.to_rfc3339())
            .bind(thread_id)
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::Storage(format!("touch thread failed: {e}")))?;

        Ok(Turn {
            id: result.last_insert_rowid(),
            thread_id,
            role,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Load all turns of a thread in creation order.
    pub async fn list_turns(&self, thread_id: i64) -> Result<Vec<Turn>, StoreError> {
        let rows =
            sqlx::query("SELECT * FROM turns WHERE thread_id = ?1 ORDER BY created_at, id")
                .bind(thread_id)
                .fetch_all(self.pool())
                .await
                .map_err(|e| StoreError::QueryFailed(format!("list turns: {e}")))?;

        rows.iter().map(row_to_turn).collect()
    }

    /// Count an owner's threads (dashboard stat).
    pub async fn count_threads(&self, user_id: i64) -> Result<i64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM threads WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(self.pool())
            .await
            .map_err(|e| StoreError::QueryFailed(format!("count threads: {e}")))?;

        row.try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))
    }
}

fn row_to_thread(row: &sqlx::sqlite::SqliteRow) -> Result<Thread, StoreError> {
    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
    let updated_at_str: String = row
        .try_get("updated_at")
        .map_err(|e| StoreError::QueryFailed(format!("updated_at column: {e}")))?;

    Ok(Thread {
        id: row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?,
        user_id: row
            .try_get("user_id")
            .map_err(|e| StoreError::QueryFailed(format!("user_id column: {e}")))?,
        title: row
            .try_get("title")
            .map_err(|e| StoreError::QueryFailed(format!("title column: {e}")))?,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

fn row_to_turn(row: &sqlx::sqlite::SqliteRow) -> Result<Turn, StoreError> {
    let role_str: String = row
        .try_get("role")
        .map_err(|e| StoreError::QueryFailed(format!("role column: {e}")))?;
    let role = Role::parse(&role_str)
        .ok_or_else(|| StoreError::QueryFailed(format!("unknown turn role: {role_str}")))?;

    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;

    Ok(Turn {
        id: row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?,
        thread_id: row
            .try_get("thread_id")
            .map_err(|e| StoreError::QueryFailed(format!("thread_id column: {e}")))?,
        role,
        content: row
            .try_get("content")
            .map_err(|e| StoreError::QueryFailed(format!("content column: {e}")))?,
        created_at: parse_timestamp(&created_at_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promoters::NewPromoter;
    use crate::test_support::test_store;

    async fn owner(store: &Store) -> i64 {
        store
            .create_promoter(NewPromoter {
                email: "owner@example.mx".into(),
                password_hash: "hash".into(),
                name: "Owner".into(),
                zona: None,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn create_find_and_scope() {
        let store = test_store().await;
        let uid = owner(&store).await;
        let thread = store.create_thread(uid, "Primer tema").await.unwrap();

        let found = store.find_thread(uid, thread.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Primer tema");

        // Another owner cannot see it
        assert!(store
            .find_thread(uid + 1, thread.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn turns_preserve_append_order() {
        let store = test_store().await;
        let uid = owner(&store).await;
        let thread = store.create_thread(uid, "t").await.unwrap();

        // Appends land within the same millisecond; id breaks the tie
        store
            .append_turn(thread.id, Role::User, "uno")
            .await
            .unwrap();
        store
            .append_turn(thread.id, Role::Assistant, "dos")
            .await
            .unwrap();
        store
            .append_turn(thread.id, Role::User, "tres")
            .await
            .unwrap();

        let turns = store.list_turns(thread.id).await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["uno", "dos", "tres"]);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn append_touches_thread_updated_at() {
        let store = test_store().await;
        let uid = owner(&store).await;
        let thread = store.create_thread(uid, "t").await.unwrap();

        store
            .append_turn(thread.id, Role::User, "hola")
            .await
            .unwrap();

        let after = store.find_thread(uid, thread.id).await.unwrap().unwrap();
        assert!(after.updated_at >= thread.updated_at);
    }

    #[tokio::test]
    async fn summaries_carry_message_count_without_bodies() {
        let store = test_store().await;
        let uid = owner(&store).await;
        let thread = store.create_thread(uid, "con mensajes").await.unwrap();
        store.create_thread(uid, "vacío").await.unwrap();

        store
            .append_turn(thread.id, Role::User, "hola")
            .await
            .unwrap();
        store
            .append_turn(thread.id, Role::Assistant, "buenas")
            .await
            .unwrap();

        let summaries = store.list_threads(uid).await.unwrap();
        assert_eq!(summaries.len(), 2);
        let with_messages = summaries.iter().find(|s| s.title == "con mensajes").unwrap();
        assert_eq!(with_messages.message_count, 2);
    }

    #[tokio::test]
    async fn delete_cascades_to_turns() {
        let store = test_store().await;
        let uid = owner(&store).await;
        let thread = store.create_thread(uid, "t").await.unwrap();
        store
            .append_turn(thread.id, Role::User, "hola")
            .await
            .unwrap();

        assert!(store.delete_thread(uid, thread.id).await.unwrap());
        assert!(store.list_turns(thread.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_is_owner_scoped() {
        let store = test_store().await;
        let uid = owner(&store).await;
        let thread = store.create_thread(uid, "t").await.unwrap();

        assert!(!store.delete_thread(uid + 1, thread.id).await.unwrap());
        assert!(store.find_thread(uid, thread.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn count_threads_per_owner() {
        let store = test_store().await;
        let uid = owner(&store).await;
        store.create_thread(uid, "a").await.unwrap();
        store.create_thread(uid, "b").await.unwrap();
        assert_eq!(store.count_threads(uid).await.unwrap(), 2);
        assert_eq!(store.count_threads(uid + 1).await.unwrap(), 0);
    }
}
