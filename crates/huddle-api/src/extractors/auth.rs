//! `AuthUser` extractor — pulls the JWT from the Authorization header and
//! validates it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use huddle_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity available to handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User id from the `sub` claim.
    pub user_id: i64,
    /// Username carried in the token.
    pub username: String,
    /// Session token from the `jti` claim.
    pub session_token: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode_token(token)?;

        Ok(AuthUser {
            user_id: claims.user_id(),
            session_token: claims.session_token(),
            username: claims.username,
        })
    }
}
