//! Message handlers — broadcast chat and direct conversations.

use axum::Json;
use axum::extract::{Query, State};
use validator::Validate;

use huddle_core::error::AppError;
use huddle_entity::message::{ChatMessage, DirectMessage};

use crate::dto::request::{ConversationQuery, CreateChatMessageRequest, CreateDirectMessageRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// How many rows the history endpoints return.
const HISTORY_LIMIT: i64 = 100;

/// GET /api/messages/chat
pub async fn list_chat(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ChatMessage>>>, ApiError> {
    let messages = state.chat_repo.list_recent(HISTORY_LIMIT).await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// POST /api/messages/chat
pub async fn create_chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateChatMessageRequest>,
) -> Result<Json<ApiResponse<ChatMessage>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let message = state.chat_repo.create(auth.user_id, &req.message).await?;
    Ok(Json(ApiResponse::ok(message)))
}

/// GET /api/messages/direct?user_id=
///
/// Opening a conversation marks everything the other party sent me as read;
/// live-feed delivery of rows I have already seen here is prevented by the
/// stream cursor, not the read flag.
pub async fn list_direct(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<ApiResponse<Vec<DirectMessage>>>, ApiError> {
    let messages = state
        .direct_repo
        .conversation(auth.user_id, query.user_id, HISTORY_LIMIT)
        .await?;
    state
        .direct_repo
        .mark_conversation_read(auth.user_id, query.user_id)
        .await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// POST /api/messages/direct
pub async fn create_direct(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateDirectMessageRequest>,
) -> Result<Json<ApiResponse<DirectMessage>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state
        .user_repo
        .find_by_id(req.recipient_id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipient does not exist"))?;

    let message = state
        .direct_repo
        .create(auth.user_id, req.recipient_id, &req.message)
        .await?;
    Ok(Json(ApiResponse::ok(message)))
}
