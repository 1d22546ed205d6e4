//! Calendar event repository.

use chrono::NaiveDate;
use sqlx::PgPool;

use huddle_core::error::{AppError, ErrorKind};
use huddle_core::result::AppResult;
use huddle_entity::event::{CalendarEvent, CreateCalendarEvent};

/// Repository for per-user calendar events.
#[derive(Debug, Clone)]
pub struct CalendarEventRepository {
    pool: PgPool,
}

impl CalendarEventRepository {
    /// Create a new calendar event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's events falling within the given month, ordered by date.
    pub async fn list_month(
        &self,
        user_id: i64,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<CalendarEvent>> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            AppError::validation(format!("Invalid year/month: {year}-{month:02}"))
        })?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| AppError::validation("Invalid month boundary"))?;

        sqlx::query_as::<_, CalendarEvent>(
            "SELECT id, title, description, event_date, created_at FROM calendar_events \
             WHERE user_id = $1 AND event_date >= $2 AND event_date < $3 \
             ORDER BY event_date ASC, id ASC",
        )
        .bind(user_id)
        .bind(first)
        .bind(next)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list calendar events", e)
        })
    }

    /// Insert a new calendar event.
    pub async fn create(&self, event: &CreateCalendarEvent) -> AppResult<CalendarEvent> {
        sqlx::query_as::<_, CalendarEvent>(
            "INSERT INTO calendar_events (user_id, title, description, event_date) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, title, description, event_date, created_at",
        )
        .bind(event.user_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.event_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create calendar event", e)
        })
    }

    /// Delete an event only if it is owned by the given user.
    ///
    /// Returns whether a row was removed.
    pub async fn delete_owned(&self, event_id: i64, user_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete calendar event", e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
