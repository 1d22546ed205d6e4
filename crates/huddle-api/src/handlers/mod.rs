//! Route handlers organized by domain.

pub mod auth;
pub mod event;
pub mod health;
pub mod message;
pub mod stream;
pub mod user;
