//! Authentication middleware

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
    http::header::AUTHORIZATION,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // User ID
    pub email: String,
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

/// Verified requester identity extracted from the JWT
#[derive(Debug, Clone)]
pub struct UserContext {
    pub user_id: Uuid,
}

/// Issue a signed session token
pub fn issue_token(user_id: Uuid, email: &str, secret: &str, expiration_hours: u64) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Resolve a bearer token to a user identity
pub fn verify_token(token: &str, secret: &str) -> AppResult<UserContext> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default()
    )?;

    let claims = token_data.claims;

    Ok(UserContext {
        user_id: Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthenticated)?,
    })
}

/// Middleware: Require user JWT authentication
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&req)?;

    let user_ctx = verify_token(&token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::Unauthenticated
    })?;

    // Insert into request extensions
    req.extensions_mut().insert(user_ctx);

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthenticated)?
        .to_str()
        .map_err(|_| AppError::Unauthenticated)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthenticated)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<UserContext>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }
}
