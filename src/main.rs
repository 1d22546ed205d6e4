//! Huddle Server — multi-user chat and calendar backend with a real-time
//! event stream.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::{EnvFilter, fmt};

use huddle_core::config::AppConfig;
use huddle_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("HUDDLE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Starting Huddle v{} (env: {env})", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Connect, migrate, and serve.
async fn run(config: AppConfig) -> Result<(), AppError> {
    let db = huddle_database::DatabasePool::connect(&config.database).await?;

    huddle_database::migration::run_migrations(db.pool()).await?;

    huddle_api::run_server(config, db.into_pool()).await
}
