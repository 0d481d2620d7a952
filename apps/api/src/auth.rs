//! Bearer-token authentication and role guards.
//!
//! Tokens are HS256 JWTs carrying the username and an admin flag. Handlers
//! opt into auth by taking an extractor argument: `AuthUser` for any valid
//! token, `AdminUser` for admin-only routes. Reads stay anonymous by simply
//! not asking for one.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::state::AppState;

const TOKEN_EXPIRY_HOURS: i64 = 24;

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub username: String,
    pub is_admin: bool,
    pub iat: usize,
    pub exp: usize,
}

/// Signs a token for `username` with the given admin flag.
pub fn create_token(username: &str, is_admin: bool, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        username: username.to_string(),
        is_admin,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_EXPIRY_HOURS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
}

/// Verifies a token's signature and expiry, returning its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
/// The scheme is matched case-insensitively; clients vary.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

/// Extractor for routes that require a valid token, admin or not.
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let token = bearer_token(header)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        let claims = verify_token(token, &state.config.secret_key)?;
        Ok(AuthUser(claims))
    }
}

/// Extractor for admin-only routes. A valid token without the admin flag is
/// rejected with 401, the same status as a missing token.
pub struct AdminUser(pub Claims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin {
            return Err(AppError::Unauthorized("Admin access required".to_string()));
        }
        Ok(AdminUser(claims))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
