//! Calendar event entity.

pub mod model;

pub use model::{CalendarEvent, CreateCalendarEvent};
