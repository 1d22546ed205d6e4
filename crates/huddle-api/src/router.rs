//! Route definitions for the Huddle HTTP API.
//!
//! All routes are mounted under `/api`. The stream route carries no
//! compression or buffering layer: SSE frames must reach the client the
//! moment they are produced.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(message_routes())
        .merge(event_routes())
        .merge(user_routes())
        .merge(stream_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth endpoints: register, login.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
}

/// Chat and direct message endpoints.
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages/chat", get(handlers::message::list_chat))
        .route("/messages/chat", post(handlers::message::create_chat))
        .route("/messages/direct", get(handlers::message::list_direct))
        .route("/messages/direct", post(handlers::message::create_direct))
}

/// Calendar event endpoints.
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::event::list_month))
        .route("/events", post(handlers::event::create))
        .route("/events/{id}", delete(handlers::event::delete))
}

/// User listing.
fn user_routes() -> Router<AppState> {
    Router::new().route("/users", get(handlers::user::list))
}

/// Live event stream.
fn stream_routes() -> Router<AppState> {
    Router::new().route("/stream", get(handlers::stream::stream))
}

/// Health check.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
