//! Authentication handlers

use axum::{extract::State, Json};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::middleware::auth::issue_token;
use crate::models::{User, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

/// Login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    // Emails are stored lowercased
    let email = req.email.trim().to_lowercase();
    let user = User::find_by_email(&state.pool, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::InternalError("Invalid password hash".to_string()))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)?;

    User::update_last_login(&state.pool, user.id).await?;

    let token = issue_token(
        user.id,
        &user.email,
        &state.config.jwt_secret,
        state.config.jwt_expiration_hours,
    )?;

    Ok(Json(LoginResponse {
        token,
        user: user.to_info(),
    }))
}

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();

    if User::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::AlreadyExists("Email already registered".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .to_string();

    let user = User::create(&state.pool, &email, req.name.as_deref(), &password_hash).await?;

    tracing::info!("New user registered: {}", user.id);

    Ok(Json(RegisterResponse {
        user_id: user.id,
        email: user.email,
    }))
}
