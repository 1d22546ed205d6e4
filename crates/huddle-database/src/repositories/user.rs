//! User repository implementation.

use sqlx::PgPool;

use huddle_core::error::{AppError, ErrorKind};
use huddle_core::result::AppResult;
use huddle_entity::user::{CreateUser, OnlineUser, User};

/// Repository for user CRUD and presence queries.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by username (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// Create a new user.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_username_key") =>
            {
                AppError::conflict(format!("Username '{}' already exists", data.username))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })
    }

    /// List all users except the given one, username ascending.
    pub async fn list_excluding(&self, user_id: i64) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id != $1 ORDER BY username ASC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// List all currently-online users except the given one.
    pub async fn list_online_excluding(&self, user_id: i64) -> AppResult<Vec<OnlineUser>> {
        sqlx::query_as::<_, OnlineUser>(
            "SELECT id, username, is_online, last_seen FROM users \
             WHERE is_online = TRUE AND id != $1 ORDER BY username ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list online users", e))
    }

    /// Set a user's derived presence flag.
    ///
    /// Going online also refreshes `last_seen`; going offline leaves it as
    /// the last recorded liveness time.
    pub async fn set_presence(&self, user_id: i64, online: bool) -> AppResult<()> {
        if online {
            sqlx::query("UPDATE users SET is_online = TRUE, last_seen = NOW() WHERE id = $1")
                .bind(user_id)
                .execute(&self.pool)
                .await
        } else {
            sqlx::query("UPDATE users SET is_online = FALSE WHERE id = $1")
                .bind(user_id)
                .execute(&self.pool)
                .await
        }
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update presence", e))?;
        Ok(())
    }

    /// Flip a user offline only when no registry rows remain for them.
    ///
    /// Single-statement so two sessions of the same user tearing down
    /// concurrently cannot race the flag in opposite directions.
    pub async fn set_offline_if_no_sessions(&self, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET is_online = FALSE \
             WHERE id = $1 AND NOT EXISTS \
               (SELECT 1 FROM active_sessions WHERE user_id = $1)",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update presence", e))?;

        Ok(result.rows_affected() > 0)
    }
}
