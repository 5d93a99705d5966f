//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    oracle_configured: bool,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        oracle_configured: !state.config.oracle_api_key.is_empty(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
