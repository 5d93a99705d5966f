//! Detection history handler

use axum::{extract::{Query, State}, Json};
use serde::Deserialize;

use crate::{AppState, AppResult};
use crate::middleware::auth::UserContext;
use crate::models::DetectionRecord;

#[derive(Debug, Deserialize, Default)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// Most recent detections of the caller, newest first
pub async fn list(
    State(state): State<AppState>,
    user: UserContext,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<DetectionRecord>>> {
    let limit = query.limit.unwrap_or(state.config.history_limit);
    let records = state.pipeline.history(user.user_id, limit).await?;
    Ok(Json(records))
}
