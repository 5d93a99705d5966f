//! SpamShield server binary

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spamshield::{config::Config, create_router, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    init_logging(&config);

    tracing::info!("SpamShield server starting...");
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));
    tracing::info!("Oracle: {} ({})", config.oracle_url, config.oracle_model);
    if config.oracle_api_key.is_empty() {
        tracing::warn!("ORACLE_API_KEY is not set; detections will fail until it is configured");
    }

    // Initialize database pool
    let pool = db::create_pool(&config.database_url).await
        .context("Failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .context("Failed to run migrations")?;

    // Build application state
    let state = AppState::new(pool, config.clone())
        .context("Failed to build oracle client")?;

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "spamshield=debug,spamshield_server=debug,tower_http=debug".into());

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
