//! # huddle-entity
//!
//! Entity models shared across the Huddle crates. Each module maps one
//! database table (or joined row shape) to a sqlx `FromRow` struct.

pub mod event;
pub mod message;
pub mod user;
