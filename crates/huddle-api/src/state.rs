//! Application state shared across all handlers.

use std::sync::Arc;

use sqlx::PgPool;

use huddle_auth::jwt::decoder::JwtDecoder;
use huddle_auth::jwt::encoder::JwtEncoder;
use huddle_auth::password::hasher::PasswordHasher;
use huddle_core::config::AppConfig;
use huddle_database::repositories::{
    CalendarEventRepository, ChatMessageRepository, DirectMessageRepository, UserRepository,
};
use huddle_realtime::{ChangeFeed, SessionRegistry};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped (or pool handles) for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool.
    pub db_pool: PgPool,

    /// JWT token encoder.
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator.
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Password hasher (Argon2id).
    pub password_hasher: Arc<PasswordHasher>,

    /// User repository.
    pub user_repo: Arc<UserRepository>,
    /// Broadcast chat repository.
    pub chat_repo: Arc<ChatMessageRepository>,
    /// Direct message repository.
    pub direct_repo: Arc<DirectMessageRepository>,
    /// Calendar event repository.
    pub event_repo: Arc<CalendarEventRepository>,

    /// Change feed backing the stream loops.
    pub change_feed: Arc<dyn ChangeFeed>,
    /// Session liveness registry backing the stream loops.
    pub session_registry: Arc<dyn SessionRegistry>,
}
