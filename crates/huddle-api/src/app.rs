//! Application builder — wires repositories, auth, and realtime into a
//! running Axum server.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use huddle_auth::jwt::decoder::JwtDecoder;
use huddle_auth::jwt::encoder::JwtEncoder;
use huddle_auth::password::hasher::PasswordHasher;
use huddle_core::config::AppConfig;
use huddle_core::error::AppError;
use huddle_database::repositories::{
    CalendarEventRepository, ChatMessageRepository, DirectMessageRepository, UserRepository,
};
use huddle_realtime::{PostgresChangeFeed, PostgresSessionRegistry};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the application state from configuration and a live pool.
pub fn build_state(config: AppConfig, db_pool: PgPool) -> AppState {
    AppState {
        jwt_encoder: Arc::new(JwtEncoder::new(&config.auth)),
        jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
        password_hasher: Arc::new(PasswordHasher::new()),

        user_repo: Arc::new(UserRepository::new(db_pool.clone())),
        chat_repo: Arc::new(ChatMessageRepository::new(db_pool.clone())),
        direct_repo: Arc::new(DirectMessageRepository::new(db_pool.clone())),
        event_repo: Arc::new(CalendarEventRepository::new(db_pool.clone())),

        change_feed: Arc::new(PostgresChangeFeed::new(db_pool.clone())),
        session_registry: Arc::new(PostgresSessionRegistry::new(db_pool.clone())),

        config: Arc::new(config),
        db_pool,
    }
}

/// Builds the complete Axum application.
pub fn build_app(config: AppConfig, db_pool: PgPool) -> Router {
    build_router(build_state(config, db_pool))
}

/// Runs the Huddle server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_app(config, db_pool);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Huddle server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Huddle server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => {
                tracing::error!("Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
