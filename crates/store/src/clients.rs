//! Client record persistence, promoter-scoped.
//!
//! Every query here filters on `promotor_id`; a row belonging to another
//! promoter is indistinguishable from a missing row.

use chrono::Utc;
use copiloto_core::error::StoreError;
use copiloto_core::{Client, ClientStatus};
use sqlx::Row;

use crate::{parse_timestamp, Store};

/// Input for creating a client record.
#[derive(Debug, Clone, Default)]
pub struct NewClient {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

/// Partial update for a client record. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub business_type: Option<String>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

impl Store {
    /// Insert a client for the given promoter.
    pub async fn insert_client(
        &self,
        promoter_id: i64,
        new: NewClient,
    ) -> Result<Client, StoreError> {
        let created_at = Utc::now();
        let status = new.status.unwrap_or_default();

        let result = sqlx::query(
            r#"
            INSERT INTO clients
                (promotor_id, name, email, phone, business_name, business_type, status, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(promoter_id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.business_name)
        .bind(&new.business_type)
        .bind(status.as_str())
        .bind(&new.notes)
        .bind(created_at.to_rfc3339())
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::Storage(format!("INSERT client failed: {e}")))?;

        Ok(Client {
            id: result.last_insert_rowid(),
            promotor_id: promoter_id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            business_name: new.business_name,
            business_type: new.business_type,
            status,
            notes: new.notes,
            created_at,
            last_contact: None,
        })
    }

    /// List clients for a promoter, newest first, optionally filtered by status.
    pub async fn list_clients(
        &self,
        promoter_id: i64,
        status: Option<ClientStatus>,
    ) -> Result<Vec<Client>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM clients WHERE promotor_id = ?1 AND status = ?2 ORDER BY created_at DESC",
                )
                .bind(promoter_id)
                .bind(status.as_str())
                .fetch_all(self.pool())
                .await
            }
            None => {
                sqlx::query(
                    "SELECT * FROM clients WHERE promotor_id = ?1 ORDER BY created_at DESC",
                )
                .bind(promoter_id)
                .fetch_all(self.pool())
                .await
            }
        }
        .map_err(|e| StoreError::QueryFailed(format!("list clients: {e}")))?;

        rows.iter().map(row_to_client).collect()
    }

    /// Find one client scoped to its promoter.
    pub async fn find_client(
        &self,
        promoter_id: i64,
        client_id: i64,
    ) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = ?1 AND promotor_id = ?2")
            .bind(client_id)
            .bind(promoter_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StoreError::QueryFailed(format!("client by id: {e}")))?;

        row.as_ref().map(row_to_client).transpose()
    }

    /// Apply a partial update and touch `last_contact`.
    ///
    /// Returns the updated row, or `None` when the client does not exist
    /// for this promoter.
    pub async fn update_client(
        &self,
        promoter_id: i64,
        client_id: i64,
        patch: ClientPatch,
    ) -> Result<Option<Client>, StoreError> {
        let Some(existing) = self.find_client(promoter_id, client_id).await? else {
            return Ok(None);
        };

        let updated = Client {
            name: patch.name.unwrap_or(existing.name),
            email: patch.email.or(existing.email),
            phone: patch.phone.or(existing.phone),
            business_name: patch.business_name.or(existing.business_name),
            business_type: patch.business_type.or(existing.business_type),
            status: patch.status.unwrap_or(existing.status),
            notes: patch.notes.or(existing.notes),
            last_contact: Some(Utc::now()),
            ..existing
        };

        sqlx::query(
            r#"
            UPDATE clients
            SET name = ?1, email = ?2, phone = ?3, business_name = ?4,
                business_type = ?5, status = ?6, notes = ?7, last_contact = ?8
            WHERE id = ?9 AND promotor_id = ?10
            "#,
        )
        .bind(&updated.name)
        .bind(&updated.email)
        .bind(&updated.phone)
        .bind(&updated.business_name)
        .bind(&updated.business_type)
        .bind(updated.status.as_str())
        .bind(&updated.notes)
        .bind(updated.last_contact.map(|t| t.to_rfc3339()))
        .bind(client_id)
        .bind(promoter_id)
        .execute(self.pool())
        .await
        .map_err(|e| StoreError::Storage(format!("UPDATE client failed: {e}")))?;

        Ok(Some(updated))
    }

    /// Delete a client scoped to its promoter. Returns whether a row went away.
    pub async fn delete_client(
        &self,
        promoter_id: i64,
        client_id: i64,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = ?1 AND promotor_id = ?2")
            .bind(client_id)
            .bind(promoter_id)
            .execute(self.pool())
            .await
            .map_err(|e| StoreError::Storage(format!("DELETE client failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count a promoter's clients, optionally by status.
    pub async fn count_clients(
        &self,
        promoter_id: i64,
        status: Option<ClientStatus>,
    ) -> Result<i64, StoreError> {
        let row = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT COUNT(*) AS cnt FROM clients WHERE promotor_id = ?1 AND status = ?2",
                )
                .bind(promoter_id)
                .bind(status.as_str())
                .fetch_one(self.pool())
                .await
            }
            None => sqlx::query("SELECT COUNT(*) AS cnt FROM clients WHERE promotor_id = ?1")
                .bind(promoter_id)
                .fetch_one(self.pool())
                .await,
        }
        .map_err(|e| StoreError::QueryFailed(format!("count clients: {e}")))?;

        row.try_get("cnt")
            .map_err(|e| StoreError::QueryFailed(format!("cnt column: {e}")))
    }
}

fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> Result<Client, StoreError> {
    let status_str: String = row
        .try_get("status")
        .map_err(|e| StoreError::QueryFailed(format!("status column: {e}")))?;
    let status = ClientStatus::parse(&status_str)
        .ok_or_else(|| StoreError::QueryFailed(format!("unknown client status: {status_str}")))?;

    let created_at_str: String = row
        .try_get("created_at")
        .map_err(|e| StoreError::QueryFailed(format!("created_at column: {e}")))?;
    let last_contact_str: Option<String> = row
        .try_get("last_contact")
        .map_err(|e| StoreError::QueryFailed(format!("last_contact column: {e}")))?;

    Ok(Client {
        id: row
            .try_get("id")
            .map_err(|e| StoreError::QueryFailed(format!("id column: {e}")))?,
        promotor_id: row
            .try_get("promotor_id")
            .map_err(|e| StoreError::QueryFailed(format!("promotor_id column: {e}")))?,
        name: row
            .try_get("name")
            .map_err(|e| StoreError::QueryFailed(format!("name column: {e}")))?,
        email: row
            .try_get("email")
            .map_err(|e| StoreError::QueryFailed(format!("email column: {e}")))?,
        phone: row
            .try_get("phone")
            .map_err(|e| StoreError::QueryFailed(format!("phone column: {e}")))?,
        business_name: row
            .try_get("business_name")
            .map_err(|e| StoreError::QueryFailed(format!("business_name column: {e}")))?,
        business_type: row
            .try_get("business_type")
            .map_err(|e| StoreError::QueryFailed(format!("business_type column: {e}")))?,
        status,
        notes: row
            .try_get("notes")
            .map_err(|e| StoreError::QueryFailed(format!("notes column: {e}")))?,
        created_at: parse_timestamp(&created_at_str),
        last_contact: last_contact_str.as_deref().map(parse_timestamp),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promoters::NewPromoter;
    use crate::test_support::test_store;

    async fn promoter(store: &Store) -> i64 {
        store
            .create_promoter(NewPromoter {
                email: "promo@example.mx".into(),
                password_hash: "hash".into(),
                name: "Promo".into(),
                zona: None,
            })
            .await
            .unwrap()
            .id
    }

    fn client_named(name: &str) -> NewClient {
        NewClient {
            name: name.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_defaults_to_prospecto() {
        let store = test_store().await;
        let pid = promoter(&store).await;
        let client = store
            .insert_client(pid, client_named("Tortillería La Luz"))
            .await
            .unwrap();
        assert_eq!(client.status, ClientStatus::Prospecto);
        assert!(client.last_contact.is_none());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let store = test_store().await;
        let pid = promoter(&store).await;
        store.insert_client(pid, client_named("A")).await.unwrap();
        store
            .insert_client(
                pid,
                NewClient {
                    name: "B".into(),
                    status: Some(ClientStatus::Activo),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let all = store.list_clients(pid, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let active = store
            .list_clients(pid, Some(ClientStatus::Activo))
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "B");
    }

    #[tokio::test]
    async fn scoping_hides_foreign_clients() {
        let store = test_store().await;
        let pid = promoter(&store).await;
        let other = store
            .create_promoter(NewPromoter {
                email: "otra@example.mx".into(),
                password_hash: "hash".into(),
                name: "Otra".into(),
                zona: None,
            })
            .await
            .unwrap()
            .id;

        let client = store.insert_client(pid, client_named("Mío")).await.unwrap();

        assert!(store.find_client(other, client.id).await.unwrap().is_none());
        assert!(!store.delete_client(other, client.id).await.unwrap());
        assert!(store
            .update_client(other, client.id, ClientPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn patch_touches_last_contact_and_keeps_rest() {
        let store = test_store().await;
        let pid = promoter(&store).await;
        let client = store
            .insert_client(
                pid,
                NewClient {
                    name: "Café Centro".into(),
                    phone: Some("555-0100".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = store
            .update_client(
                pid,
                client.id,
                ClientPatch {
                    status: Some(ClientStatus::Activo),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, ClientStatus::Activo);
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert!(updated.last_contact.is_some());
    }

    #[tokio::test]
    async fn counts_by_status() {
        let store = test_store().await;
        let pid = promoter(&store).await;
        for status in [
            ClientStatus::Activo,
            ClientStatus::Activo,
            ClientStatus::Prospecto,
        ] {
            store
                .insert_client(
                    pid,
                    NewClient {
                        name: "x".into(),
                        status: Some(status),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }

        assert_eq!(store.count_clients(pid, None).await.unwrap(), 3);
        assert_eq!(
            store
                .count_clients(pid, Some(ClientStatus::Activo))
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = test_store().await;
        let pid = promoter(&store).await;
        let client = store.insert_client(pid, client_named("X")).await.unwrap();
        assert!(store.delete_client(pid, client.id).await.unwrap());
        assert!(store.find_client(pid, client.id).await.unwrap().is_none());
    }
}
