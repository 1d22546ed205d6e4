//! Wire events emitted on a live connection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use huddle_core::result::AppResult;
use huddle_entity::message::{ChatMessage, DirectMessage};
use huddle_entity::user::OnlineUser;

/// One named event frame as delivered to the client.
///
/// The wire names and payload shapes are a compatibility contract with the
/// browser client; changing them breaks deployed frontends.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StreamEvent {
    /// Identity echo sent once after the connection is established.
    Connected(ConnectedPayload),
    /// One new broadcast chat message.
    ChatMessage(ChatMessage),
    /// One new direct message addressed to this connection's user.
    DirectMessage(DirectMessage),
    /// Full snapshot of currently-online users (excluding self).
    UserStatus(UserStatusPayload),
    /// Periodic liveness signal carrying the server time.
    Heartbeat(HeartbeatPayload),
    /// A storage or runtime fault surfaced to the client.
    Error(ErrorPayload),
}

/// Payload of the `connected` event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConnectedPayload {
    pub user_id: i64,
    pub username: String,
}

/// Payload of the `user_status` event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserStatusPayload {
    pub online_users: Vec<OnlineUser>,
}

/// Payload of the `heartbeat` event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HeartbeatPayload {
    pub timestamp: DateTime<Utc>,
}

/// Payload of the `error` event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorPayload {
    pub message: String,
}

impl StreamEvent {
    /// Builds a `connected` identity echo.
    pub fn connected(user_id: i64, username: impl Into<String>) -> Self {
        Self::Connected(ConnectedPayload {
            user_id,
            username: username.into(),
        })
    }

    /// Builds a `user_status` snapshot.
    pub fn user_status(online_users: Vec<OnlineUser>) -> Self {
        Self::UserStatus(UserStatusPayload { online_users })
    }

    /// Builds a `heartbeat` carrying the current server time.
    pub fn heartbeat(timestamp: DateTime<Utc>) -> Self {
        Self::Heartbeat(HeartbeatPayload { timestamp })
    }

    /// Builds an `error` event from a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// The event name used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::ChatMessage(_) => "chat_message",
            Self::DirectMessage(_) => "direct_message",
            Self::UserStatus(_) => "user_status",
            Self::Heartbeat(_) => "heartbeat",
            Self::Error(_) => "error",
        }
    }

    /// Serializes the payload to the JSON string sent as the frame data.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_stable() {
        assert_eq!(StreamEvent::connected(1, "a").name(), "connected");
        assert_eq!(StreamEvent::heartbeat(Utc::now()).name(), "heartbeat");
        assert_eq!(StreamEvent::user_status(vec![]).name(), "user_status");
        assert_eq!(StreamEvent::error("boom").name(), "error");
    }

    #[test]
    fn test_payload_serializes_without_wrapper() {
        let json = StreamEvent::connected(7, "dana").to_json().unwrap();
        assert_eq!(json, r#"{"user_id":7,"username":"dana"}"#);
    }

    #[test]
    fn test_user_status_payload_shape() {
        let json = StreamEvent::user_status(vec![]).to_json().unwrap();
        assert_eq!(json, r#"{"online_users":[]}"#);
    }
}
