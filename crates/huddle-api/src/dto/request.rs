//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request body. Minimum lengths beyond these baselines come
/// from `AuthConfig` and are enforced in the handler.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Optional email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Broadcast chat message body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateChatMessageRequest {
    /// Message text.
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
}

/// Direct message body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDirectMessageRequest {
    /// Recipient user id.
    pub recipient_id: i64,
    /// Message text.
    #[validate(length(min = 1, message = "Message cannot be empty"))]
    pub message: String,
}

/// Calendar event creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Event title.
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Event date as `YYYY-MM-DD`.
    #[validate(length(min = 1, message = "Event date is required"))]
    pub event_date: String,
}

/// Query parameters of `GET /api/messages/direct`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationQuery {
    /// The other party of the conversation.
    pub user_id: i64,
}

/// Query parameters of `GET /api/events`.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthQuery {
    /// Month as `YYYY-MM`.
    pub month: String,
}

/// Query parameters of `GET /api/stream`.
///
/// EventSource cannot set request headers, so the JWT may also arrive as a
/// query parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamQuery {
    /// Resume cursor for the broadcast chat feed.
    #[serde(default)]
    pub last_chat_id: i64,
    /// Resume cursor for the direct message feed.
    #[serde(default)]
    pub last_direct_id: i64,
    /// JWT, as an alternative to the Authorization header.
    pub token: Option<String>,
}
