//! SpamShield Backend
//!
//! Multi-modal spam and phishing detection service.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SPAMSHIELD                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Detection Pipeline     │ │
//! │  │  Gateway  │  │  Service  │  │  normalize → oracle →   │ │
//! │  │  (Axum)   │  │  (JWT)    │  │  parse → persist        │ │
//! │  └─────┬─────┘  └─────┬─────┘  └──────┬─────────────┬────┘ │
//! │        └──────────────┼───────────────┘             │      │
//! │                       ▼                             ▼      │
//! │                ┌─────────────┐              ┌────────────┐ │
//! │                │ PostgreSQL  │              │ AI Oracle  │ │
//! │                └─────────────┘              └────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod detection;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

use detection::media::{PlaceholderTextExtractor, PlaceholderTranscriber};
use detection::normalizer::Normalizer;
use detection::oracle::HttpOracle;
use detection::store::PgDetectionStore;
use detection::DetectionPipeline;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
    pub pipeline: Arc<DetectionPipeline>,
}

impl AppState {
    /// Production wiring: HTTP oracle, Postgres history, placeholder media engines
    pub fn new(pool: sqlx::PgPool, config: config::Config) -> Result<Self, reqwest::Error> {
        let oracle = HttpOracle::from_config(&config)?;
        let normalizer = Normalizer::new(
            Arc::new(PlaceholderTranscriber),
            Arc::new(PlaceholderTextExtractor),
        );
        let store = PgDetectionStore::new(pool.clone());

        let pipeline = DetectionPipeline::new(normalizer, Arc::new(oracle), Arc::new(store));

        Ok(Self {
            pool,
            config,
            pipeline: Arc::new(pipeline),
        })
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/register", post(handlers::auth::register));

    // User routes (JWT auth)
    let user_routes = Router::new()
        .route(
            "/api/v1/detect",
            post(handlers::detect::detect)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/api/v1/detections", get(handlers::history::list))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_auth
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
