//! Promoter authentication: password hashing, JWT issuance, and the
//! bearer-token extractor used by every protected handler.

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::Json;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use copiloto_core::Promoter;
use copiloto_store::NewPromoter;

use crate::{reject, Rejection, SharedState};

// --- Password hashing ---

/// Hash a password with a random 16-byte salt.
///
/// Format: `base64(salt)$base64(sha256(salt || password))`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!("{}${}", B64.encode(salt), B64.encode(digest))
}

/// Verify a password against a stored `salt$digest` hash.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_b64, digest_b64)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt_b64), B64.decode(digest_b64)) else {
        return false;
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    digest.as_slice() == expected.as_slice()
}

// --- JWT ---

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Promoter id.
    pub sub: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys plus token lifetime.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl JwtKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_hours,
        }
    }

    pub fn issue(&self, promoter_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: promoter_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Decode and validate a token, including its expiry.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .ok()
            .map(|data| data.claims)
    }
}

// --- Extractor ---

/// The authenticated promoter, resolved from the `Authorization` header.
pub struct AuthPromoter(pub Promoter);

impl FromRequestParts<SharedState> for AuthPromoter {
    type Rejection = Rejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "missing bearer token"))?;

        let claims = state
            .jwt
            .verify(token)
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "invalid or expired token"))?;

        let promoter = state
            .store
            .find_promoter(claims.sub)
            .await
            .map_err(|e| crate::map_error(e.into()))?
            .filter(|p| p.is_active)
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "account not found or disabled"))?;

        Ok(AuthPromoter(promoter))
    }
}

// --- Handlers ---

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub zona: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Promoter,
}

pub async fn register_handler(
    State(state): State<SharedState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Rejection> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.name.trim().is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "email and name are required",
        ));
    }
    if payload.password.len() < 8 {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "password must be at least 8 characters",
        ));
    }

    let existing = state
        .store
        .find_promoter_by_email(&email)
        .await
        .map_err(|e| crate::map_error(e.into()))?;
    if existing.is_some() {
        return Err(reject(StatusCode::CONFLICT, "email already registered"));
    }

    let promoter = state
        .store
        .create_promoter(NewPromoter {
            email,
            password_hash: hash_password(&payload.password),
            name: payload.name.trim().to_string(),
            zona: payload.zona.filter(|z| !z.trim().is_empty()),
        })
        .await
        .map_err(|e| crate::map_error(e.into()))?;

    info!(promoter_id = promoter.id, "Promoter registered");

    let token = state
        .jwt
        .issue(promoter.id)
        .map_err(|_| reject(StatusCode::INTERNAL_SERVER_ERROR, "token issuance failed"))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: promoter,
        }),
    ))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, Rejection> {
    let email = payload.email.trim().to_lowercase();

    // One rejection for every failure mode; no account enumeration.
    let unauthorized = || reject(StatusCode::UNAUTHORIZED, "invalid credentials");

    let promoter = state
        .store
        .find_promoter_by_email(&email)
        .await
        .map_err(|e| crate::map_error(e.into()))?
        .ok_or_else(unauthorized)?;

    if !promoter.is_active || !verify_password(&payload.password, &promoter.password_hash) {
        return Err(unauthorized());
    }

    let token = state
        .jwt
        .issue(promoter.id)
        .map_err(|_| reject(StatusCode::INTERNAL_SERVER_ERROR, "token issuance failed"))?;

    Ok(Json(AuthResponse {
        token,
        user: promoter,
    }))
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: Promoter,
}

pub async fn me_handler(AuthPromoter(promoter): AuthPromoter) -> Json<MeResponse> {
    Json(MeResponse { user: promoter })
}
