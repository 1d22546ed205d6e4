//! Auth handlers — register and login.

use axum::Json;
use axum::extract::State;
use validator::Validate;

use huddle_core::error::AppError;
use huddle_entity::user::CreateUser;

use crate::dto::request::{LoginRequest, RegisterRequest};
use crate::dto::response::{ApiResponse, AuthResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let auth_config = &state.config.auth;
    if req.username.chars().count() < auth_config.username_min_length {
        return Err(AppError::validation(format!(
            "Username must be at least {} characters",
            auth_config.username_min_length
        ))
        .into());
    }
    if req.password.chars().count() < auth_config.password_min_length {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters",
            auth_config.password_min_length
        ))
        .into());
    }

    if state.user_repo.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::conflict("Username is already taken").into());
    }

    let password_hash = state.password_hasher.hash_password(&req.password)?;
    let user = state
        .user_repo
        .create(&CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await?;

    let (token, expires_at) = state.jwt_encoder.generate_token(user.id, &user.username)?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    Ok(Json(ApiResponse::ok(AuthResponse {
        token,
        expires_at,
        user: user.into(),
    })))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let mut user = state
        .user_repo
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

    let valid = state
        .password_hasher
        .verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(AppError::authentication("Invalid username or password").into());
    }

    state.user_repo.set_presence(user.id, true).await?;
    user.is_online = true;

    let (token, expires_at) = state.jwt_encoder.generate_token(user.id, &user.username)?;
    tracing::info!(user_id = user.id, username = %user.username, "user logged in");

    Ok(Json(ApiResponse::ok(AuthResponse {
        token,
        expires_at,
        user: user.into(),
    })))
}
