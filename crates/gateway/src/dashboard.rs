//! Per-promoter dashboard counters, computed live from the store.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;

use copiloto_core::ClientStatus;

use crate::auth::AuthPromoter;
use crate::{Rejection, SharedState};

#[derive(Serialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub active_clients: i64,
    pub prospects: i64,
    pub conversations: i64,
    pub zona: Option<String>,
}

pub async fn stats_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
) -> Result<Json<DashboardStats>, Rejection> {
    let store = &state.store;

    let total_clients = store
        .count_clients(promoter.id, None)
        .await
        .map_err(|e| crate::map_error(e.into()))?;
    let active_clients = store
        .count_clients(promoter.id, Some(ClientStatus::Activo))
        .await
        .map_err(|e| crate::map_error(e.into()))?;
    let prospects = store
        .count_clients(promoter.id, Some(ClientStatus::Prospecto))
        .await
        .map_err(|e| crate::map_error(e.into()))?;
    let conversations = store
        .count_threads(promoter.id)
        .await
        .map_err(|e| crate::map_error(e.into()))?;

    Ok(Json(DashboardStats {
        total_clients,
        active_clients,
        prospects,
        conversations,
        zona: promoter.zona,
    }))
}
