//! Copilot endpoints: conversational chat plus the one-shot prompt tools.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use copiloto_chat::{ClientSnapshot, SituationalContext};
use copiloto_core::model::TokenUsage;
use copiloto_core::{ThreadSummary, Turn};

use crate::auth::AuthPromoter;
use crate::{reject, Rejection, SharedState};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Existing conversation id (omit to start a new one).
    #[serde(default)]
    pub conversation_id: Option<i64>,
    /// Client under discussion, injected into the model context.
    #[serde(default)]
    pub client_id: Option<i64>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub conversation_id: i64,
    pub response: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, Rejection> {
    let mut ctx = SituationalContext::for_promoter(&promoter);

    if let Some(client_id) = payload.client_id {
        let client = state
            .store
            .find_client(promoter.id, client_id)
            .await
            .map_err(|e| crate::map_error(e.into()))?
            .ok_or_else(|| reject(StatusCode::NOT_FOUND, "client not found"))?;
        ctx = ctx.with_client(&client);
    }

    let outcome = state
        .copilot
        .send_message(promoter.id, payload.conversation_id, &payload.message, &ctx)
        .await
        .map_err(crate::map_error)?;

    Ok(Json(ChatResponse {
        conversation_id: outcome.thread_id,
        response: outcome.response,
        success: outcome.success,
        usage: outcome.usage,
    }))
}

#[derive(Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ThreadSummary>,
}

pub async fn list_conversations_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
) -> Result<Json<ConversationListResponse>, Rejection> {
    let conversations = state
        .copilot
        .list_threads(promoter.id)
        .await
        .map_err(crate::map_error)?;
    Ok(Json(ConversationListResponse { conversations }))
}

#[derive(Serialize)]
pub struct ConversationDetail {
    pub id: i64,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub messages: Vec<Turn>,
}

pub async fn get_conversation_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Path(id): Path<i64>,
) -> Result<Json<ConversationDetail>, Rejection> {
    let (thread, turns) = state
        .copilot
        .get_thread(promoter.id, id)
        .await
        .map_err(crate::map_error)?;

    Ok(Json(ConversationDetail {
        id: thread.id,
        title: thread.title,
        created_at: thread.created_at,
        updated_at: thread.updated_at,
        messages: turns,
    }))
}

pub async fn delete_conversation_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Path(id): Path<i64>,
) -> Result<StatusCode, Rejection> {
    state
        .copilot
        .delete_thread(promoter.id, id)
        .await
        .map_err(crate::map_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct GenerateMessageRequest {
    pub client_id: i64,
    pub purpose: String,
}

#[derive(Serialize)]
pub struct GenerateMessageResponse {
    pub message: String,
    pub success: bool,
}

pub async fn generate_message_handler(
    State(state): State<SharedState>,
    AuthPromoter(promoter): AuthPromoter,
    Json(payload): Json<GenerateMessageRequest>,
) -> Result<Json<GenerateMessageResponse>, Rejection> {
    let client = state
        .store
        .find_client(promoter.id, payload.client_id)
        .await
        .map_err(|e| crate::map_error(e.into()))?
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "client not found"))?;

    let outcome = state
        .copilot
        .generate_client_message(&ClientSnapshot::from(&client), &payload.purpose)
        .await
        .map_err(crate::map_error)?;

    Ok(Json(GenerateMessageResponse {
        message: outcome.text,
        success: outcome.success,
    }))
}

#[derive(Deserialize)]
pub struct AnalyzeOpportunityRequest {
    pub description: String,
}

#[derive(Serialize)]
pub struct AnalyzeOpportunityResponse {
    pub analysis: String,
    pub success: bool,
}

pub async fn analyze_opportunity_handler(
    State(state): State<SharedState>,
    AuthPromoter(_promoter): AuthPromoter,
    Json(payload): Json<AnalyzeOpportunityRequest>,
) -> Result<Json<AnalyzeOpportunityResponse>, Rejection> {
    let outcome = state
        .copilot
        .analyze_opportunity(&payload.description)
        .await
        .map_err(crate::map_error)?;

    Ok(Json(AnalyzeOpportunityResponse {
        analysis: outcome.text,
        success: outcome.success,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_router, test_state};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn call(
        state: &SharedState,
        token: &str,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"));
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = test_router(state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    async fn register(state: &SharedState, email: &str) -> String {
        let (status, body) = call(
            state,
            "",
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "email": email,
                "password": "correcthorse",
                "name": "Promotor"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn chat_creates_conversation_and_replies() {
        let state = test_state().await;
        let token = register(&state, "p@example.mx").await;

        let (status, body) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/chat",
            Some(serde_json::json!({ "message": "Hola, necesito ayuda con un cliente" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["response"], "respuesta de prueba");
        let conversation_id = body["conversation_id"].as_i64().unwrap();

        let (status, detail) = call(
            &state,
            &token,
            "GET",
            &format!("/api/copilot/conversations/{conversation_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["title"], "Hola, necesito ayuda con un cliente");
        assert_eq!(detail["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_chat_message_is_bad_request() {
        let state = test_state().await;
        let token = register(&state, "p@example.mx").await;

        let (status, _) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/chat",
            Some(serde_json::json!({ "message": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chat_with_unknown_client_is_404() {
        let state = test_state().await;
        let token = register(&state, "p@example.mx").await;

        let (status, _) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/chat",
            Some(serde_json::json!({ "message": "hola", "client_id": 999 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn conversations_are_owner_scoped() {
        let state = test_state().await;
        let owner = register(&state, "owner@example.mx").await;
        let intruder = register(&state, "intruder@example.mx").await;

        let (_, body) = call(
            &state,
            &owner,
            "POST",
            "/api/copilot/chat",
            Some(serde_json::json!({ "message": "hola" })),
        )
        .await;
        let id = body["conversation_id"].as_i64().unwrap();

        let (status, _) = call(
            &state,
            &intruder,
            "GET",
            &format!("/api/copilot/conversations/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &state,
            &intruder,
            "DELETE",
            &format!("/api/copilot/conversations/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = call(&state, &intruder, "GET", "/api/copilot/conversations", None).await;
        assert_eq!(list["conversations"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn delete_conversation_removes_it() {
        let state = test_state().await;
        let token = register(&state, "p@example.mx").await;

        let (_, body) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/chat",
            Some(serde_json::json!({ "message": "hola" })),
        )
        .await;
        let id = body["conversation_id"].as_i64().unwrap();

        let (status, _) = call(
            &state,
            &token,
            "DELETE",
            &format!("/api/copilot/conversations/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(
            &state,
            &token,
            "GET",
            &format!("/api/copilot/conversations/{id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn generate_message_requires_owned_client() {
        let state = test_state().await;
        let token = register(&state, "p@example.mx").await;

        let (status, _) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/generate-message",
            Some(serde_json::json!({ "client_id": 1, "purpose": "seguimiento" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, client) = call(
            &state,
            &token,
            "POST",
            "/api/clients",
            Some(serde_json::json!({ "name": "Café Centro" })),
        )
        .await;
        let client_id = client["id"].as_i64().unwrap();

        let (status, body) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/generate-message",
            Some(serde_json::json!({ "client_id": client_id, "purpose": "seguimiento" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "respuesta de prueba");
    }

    #[tokio::test]
    async fn analyze_opportunity_round_trip() {
        let state = test_state().await;
        let token = register(&state, "p@example.mx").await;

        let (status, body) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/analyze-opportunity",
            Some(serde_json::json!({ "description": "tienda quiere aceptar pagos de EEUU" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["analysis"], "respuesta de prueba");

        let (status, _) = call(
            &state,
            &token,
            "POST",
            "/api/copilot/analyze-opportunity",
            Some(serde_json::json!({ "description": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
