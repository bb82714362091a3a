//! HTTP API gateway for Copiloto.
//!
//! Exposes the REST surface under `/api`:
//!
//! - `GET  /api/health`                        — liveness probe, no auth
//! - `POST /api/auth/register`                 — create a promoter account
//! - `POST /api/auth/login`                    — exchange credentials for a JWT
//! - `GET  /api/auth/me`                       — authenticated profile
//! - `GET|POST /api/clients`                   — list / create clients
//! - `GET|PUT|DELETE /api/clients/{id}`        — single client
//! - `POST /api/copilot/chat`                  — conversational copilot
//! - `GET  /api/copilot/conversations`         — thread summaries
//! - `GET|DELETE /api/copilot/conversations/{id}`
//! - `POST /api/copilot/generate-message`      — one-shot client message draft
//! - `POST /api/copilot/analyze-opportunity`   — one-shot opportunity analysis
//! - `GET  /api/dashboard/stats`               — per-promoter counters
//!
//! Built on Axum; everything except `/api/health`, register and login
//! requires a bearer JWT.

pub mod auth;
pub mod clients;
pub mod copilot;
pub mod dashboard;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

use copiloto_chat::Copilot;
use copiloto_config::AppConfig;
use copiloto_core::Error;
use copiloto_store::Store;

/// Shared application state for the gateway.
pub struct AppState {
    pub store: Store,
    pub copilot: Copilot,
    pub jwt: auth::JwtKeys,
    pub model_name: String,
}

pub type SharedState = Arc<AppState>;

/// JSON error body returned with every non-2xx response.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type Rejection = (StatusCode, Json<ErrorResponse>);

pub(crate) fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a domain error onto an HTTP rejection. Internal causes are logged
/// and hidden behind a generic 500 body.
pub(crate) fn map_error(err: Error) -> Rejection {
    match err {
        Error::NotFound(what) => reject(StatusCode::NOT_FOUND, format!("{what} not found")),
        Error::Validation(msg) => reject(StatusCode::BAD_REQUEST, msg),
        other => {
            error!(error = %other, "Request failed");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/me", get(auth::me_handler))
        .route(
            "/clients",
            get(clients::list_handler).post(clients::create_handler),
        )
        .route(
            "/clients/{id}",
            get(clients::get_handler)
                .put(clients::update_handler)
                .delete(clients::delete_handler),
        )
        .route("/copilot/chat", post(copilot::chat_handler))
        .route(
            "/copilot/conversations",
            get(copilot::list_conversations_handler),
        )
        .route(
            "/copilot/conversations/{id}",
            get(copilot::get_conversation_handler).delete(copilot::delete_conversation_handler),
        )
        .route(
            "/copilot/generate-message",
            post(copilot::generate_message_handler),
        )
        .route(
            "/copilot/analyze-opportunity",
            post(copilot::analyze_opportunity_handler),
        )
        .route("/dashboard/stats", get(dashboard::stats_handler))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1 MB body limit
        .layer(build_cors(cors_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS policy: explicit origins from config, or permissive when none are
/// configured (local development).
fn build_cors(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
///
/// Composition root for the service: opens the store, selects the model
/// backend from config, and shares both through [`AppState`].
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let store = Store::new(&config.database.url).await?;
    let model = copiloto_model::build_from_config(&config);
    let model_name = model.name().to_string();
    let copilot = Copilot::new(store.clone(), model);

    let state = Arc::new(AppState {
        store,
        copilot,
        jwt: auth::JwtKeys::new(&config.auth.jwt_secret, config.auth.token_ttl_hours as i64),
        model_name,
    });

    let app = build_router(state, &config.gateway.cors_origins);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
}

async fn health_handler(
    axum::extract::State(state): axum::extract::State<SharedState>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model: state.model_name.clone(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint_is_open() {
        let app = test_support::test_router(test_support::test_state().await);

        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["model"], "stub");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let app = test_support::test_router(test_support::test_state().await);

        for uri in [
            "/api/auth/me",
            "/api/clients",
            "/api/copilot/conversations",
            "/api/dashboard/stats",
        ] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_support::test_router(test_support::test_state().await);

        let req = Request::builder()
            .uri("/api/nope")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
