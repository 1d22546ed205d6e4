//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user in the Huddle system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier (monotonically increasing).
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Derived presence flag, recomputed from the session registry.
    pub is_online: bool,
    /// Last time any of this user's sessions was seen alive.
    pub last_seen: Option<DateTime<Utc>>,
    /// When the user registered.
    pub join_date: DateTime<Utc>,
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
}

/// Presence row for the `user_status` snapshot event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OnlineUser {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Presence flag (always true in a snapshot of online users).
    pub is_online: bool,
    /// Last time this user was seen alive.
    pub last_seen: Option<DateTime<Utc>>,
}
