//! Calendar event handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::NaiveDate;
use validator::Validate;

use huddle_core::error::AppError;
use huddle_entity::event::{CalendarEvent, CreateCalendarEvent};

use crate::dto::request::{CreateEventRequest, MonthQuery};
use crate::dto::response::{ApiResponse, EventsMonthResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/events?month=YYYY-MM
pub async fn list_month(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<ApiResponse<EventsMonthResponse>>, ApiError> {
    let (year, month) = parse_month(&query.month)?;
    let events = state.event_repo.list_month(auth.user_id, year, month).await?;
    Ok(Json(ApiResponse::ok(EventsMonthResponse::group(events))))
}

/// POST /api/events
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<CalendarEvent>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let event_date = NaiveDate::parse_from_str(&req.event_date, "%Y-%m-%d")
        .map_err(|_| AppError::validation("Event date must be YYYY-MM-DD"))?;

    let event = state
        .event_repo
        .create(&CreateCalendarEvent {
            user_id: auth.user_id,
            title: req.title,
            description: req.description,
            event_date,
        })
        .await?;
    Ok(Json(ApiResponse::ok(event)))
}

/// DELETE /api/events/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let removed = state.event_repo.delete_owned(event_id, auth.user_id).await?;
    if !removed {
        return Err(AppError::not_found("Event not found").into());
    }
    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Event deleted".to_string(),
    })))
}

/// Parses `YYYY-MM` into a (year, month) pair.
fn parse_month(value: &str) -> Result<(i32, u32), AppError> {
    let parsed = value
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
        .filter(|(_, m)| (1..=12).contains(m));

    parsed.ok_or_else(|| AppError::validation("Month must be YYYY-MM"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month_accepts_valid_input() {
        assert_eq!(parse_month("2024-03").unwrap(), (2024, 3));
        assert_eq!(parse_month("1999-12").unwrap(), (1999, 12));
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert!(parse_month("2024").is_err());
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-00").is_err());
        assert!(parse_month("march").is_err());
    }
}
