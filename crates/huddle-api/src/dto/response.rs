//! Response DTOs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use huddle_entity::event::CalendarEvent;
use huddle_entity::user::User;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

/// User summary for responses. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email, if provided.
    pub email: Option<String>,
    /// Whether the user currently has a live session.
    pub is_online: bool,
    /// Last time the user was seen online.
    pub last_seen: Option<DateTime<Utc>>,
    /// Account creation time.
    pub join_date: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_online: user.is_online,
            last_seen: user.last_seen,
            join_date: user.join_date,
        }
    }
}

/// Login/registration response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Signed JWT.
    pub token: String,
    /// Token expiration.
    pub expires_at: DateTime<Utc>,
    /// The authenticated user.
    pub user: UserResponse,
}

/// Month view of calendar events, grouped by day.
///
/// Keys are `YYYY-MM-DD`; `BTreeMap` keeps days sorted in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsMonthResponse {
    /// Events of the month keyed by date.
    pub events: BTreeMap<String, Vec<CalendarEvent>>,
}

impl EventsMonthResponse {
    /// Groups a date-ordered event list by day.
    pub fn group(events: Vec<CalendarEvent>) -> Self {
        let mut grouped: BTreeMap<String, Vec<CalendarEvent>> = BTreeMap::new();
        for event in events {
            grouped
                .entry(event.event_date.format("%Y-%m-%d").to_string())
                .or_default()
                .push(event);
        }
        Self { events: grouped }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(id: i64, date: NaiveDate) -> CalendarEvent {
        CalendarEvent {
            id,
            title: format!("event {id}"),
            description: None,
            event_date: date,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_month_grouping_buckets_by_day() {
        let d1 = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let grouped = EventsMonthResponse::group(vec![event(1, d1), event(2, d1), event(3, d2)]);

        assert_eq!(grouped.events.len(), 2);
        assert_eq!(grouped.events["2024-03-05"].len(), 2);
        assert_eq!(grouped.events["2024-03-09"].len(), 1);
    }
}
