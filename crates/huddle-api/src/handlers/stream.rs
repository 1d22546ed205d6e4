//! SSE stream endpoint — the entry point into the realtime loop.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use futures::Stream;
use futures::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use huddle_core::error::AppError;
use huddle_realtime::{ChannelSink, ConnectionIdentity, CursorPair, StreamLoop};

use crate::dto::request::StreamQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/stream?last_chat_id=&last_direct_id=
///
/// Authentication happens before any registry write: a bad token rejects
/// the request with 401 and leaves no session row behind. The loop runs as
/// its own task; dropping the response body closes the channel, which the
/// loop observes as the disconnect signal.
pub async fn stream(
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, AppError>>>, ApiError> {
    let token = resolve_token(&query, &headers)?;
    let claims = state.jwt_decoder.decode_token(&token)?;

    let identity = ConnectionIdentity {
        user_id: claims.user_id(),
        session_token: claims.session_token(),
        username: claims.username,
    };
    let cursors = CursorPair::new(query.last_chat_id, query.last_direct_id);

    let (sink, rx) = ChannelSink::new(state.config.realtime.channel_buffer_size);
    let stream_loop = StreamLoop::new(
        identity,
        cursors,
        state.change_feed.clone(),
        state.session_registry.clone(),
        Arc::new(sink),
        state.config.realtime.clone(),
    );
    tokio::spawn(stream_loop.run());

    let events = ReceiverStream::new(rx).map(|event| -> Result<Event, AppError> {
        Ok(Event::default().event(event.name()).data(event.to_json()?))
    });

    Ok(Sse::new(events))
}

/// The JWT comes from the `token` query parameter (EventSource cannot set
/// headers) or from a standard Bearer header.
fn resolve_token(query: &StreamQuery, headers: &HeaderMap) -> Result<String, AppError> {
    if let Some(token) = &query.token {
        return Ok(token.clone());
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
        .ok_or_else(|| AppError::authentication("Missing stream token"))
}
