//! Client (cartera) CRUD, scoped to the authenticated promoter.
//!
//! Every mutation recomputes the promoter's `clientes_activos` counter
//! from the table, so the counter can drift at most between the write and
//! the recount, never across requests.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use copiloto_core::{Client, ClientStatus};
use copiloto_store::{ClientPatch, NewClient};

use crate::auth::AuthPromoter;
use crate::{reject, Rejection, SharedState};

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateClientRequest {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateClientRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<Client>,
    pub total: usize,
}

fn parse_status(raw: &str) -> Result<ClientStatus, Rejection> {
    ClientStatus::parse(raw)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, format!("unknown status: {raw}")))
}

/// Recount `activo` rows and persist the counter on the promoter.
async fn refresh_active_count(state: &SharedState, promoter_id: i64) -> Result<(), Rejection> {
    let count = state
        .store
        .count_clients(promoter_id, Some(ClientStatus::Activo))
        .await
        .map_err(|e| crate::map_error(e.into()))?;
    state
        .store
        .set_active_client_count(promoter_id, count)
        .await
        .map_err(|e| crate::map_error(e.into()))?;
    Ok(())
}

pub async fn list_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Query(query): Query<ListQuery>,
) -> Result<Json<ClientListResponse>, Rejection> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    let clients = state
        .store
        .list_clients(promoter.id, status)
        .await
        .map_err(|e| crate::map_error(e.into()))?;

    let total = clients.len();
    Ok(Json(ClientListResponse { clients, total }))
}

pub async fn create_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<Client>), Rejection> {
    if payload.name.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "name is required"));
    }

    let status = match payload.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    let client = state
        .store
        .insert_client(
            promoter.id,
            NewClient {
                name: payload.name.trim().to_string(),
                email: payload.email,
                phone: payload.phone,
                business_name: payload.business_name,
                business_type: payload.business_type,
                status,
                notes: payload.notes,
            },
        )
        .await
        .map_err(|e| crate::map_error(e.into()))?;

    refresh_active_count(&state, promoter.id).await?;

    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Path(id): Path<i64>,
) -> Result<Json<Client>, Rejection> {
    state
        .store
        .find_client(promoter.id, id)
        .await
        .map_err(|e| crate::map_error(e.into()))?
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "client not found"))
}

pub async fn update_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<Client>, Rejection> {
    let status = match payload.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    let patch = ClientPatch {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        business_name: payload.business_name,
        business_type: payload.business_type,
        status,
        notes: payload.notes,
    };

    let client = state
        .store
        .update_client(promoter.id, id, patch)
        .await
        .map_err(|e| crate::map_error(e.into()))?
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "client not found"))?;

    refresh_active_count(&state, promoter.id).await?;

    Ok(Json(client))
}

pub async fn delete_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Path(id): Path<i64>,
) -> Result<StatusCode, Rejection> {
    let deleted = state
        .store
        .delete_client(promoter.id, id)
        .await
        .map_err(|e| crate::map_error(e.into()))?;

    if !deleted {
        return Err(reject(StatusCode::NOT_FOUND, "client not found"));
    }

    refresh_active_count(&state, promoter.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
