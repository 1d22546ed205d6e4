//! Calendar event entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A calendar event owned by a single user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CalendarEvent {
    /// Unique event identifier.
    pub id: i64,
    /// Event title.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// The day the event takes place.
    pub event_date: NaiveDate,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCalendarEvent {
    /// Owning user.
    pub user_id: i64,
    /// Event title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Event day.
    pub event_date: NaiveDate,
}
