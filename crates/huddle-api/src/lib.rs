//! # huddle-api
//!
//! HTTP API layer for Huddle built on Axum.
//!
//! Provides the REST endpoints (auth, messages, events, users), the SSE
//! stream endpoint, middleware (CORS, logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use error::ApiError;
pub use state::AppState;
