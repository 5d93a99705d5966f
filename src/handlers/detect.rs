//! Detection handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{AppState, AppError, AppResult};
use crate::detection::{DetectionRequest, DetectionResponse};
use crate::middleware::auth::UserContext;

/// Inbound body: `content` is raw text for text/link, base64 for voice/image
#[derive(Debug, Deserialize)]
pub struct DetectPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub content: Option<String>,
}

/// Run one detection for the authenticated user
pub async fn detect(
    State(state): State<AppState>,
    user: UserContext,
    payload: Result<Json<DetectPayload>, JsonRejection>,
) -> AppResult<Json<DetectionResponse>> {
    let Json(payload) = payload.map_err(body_error)?;

    let request = DetectionRequest::new(user.user_id, payload.kind.as_deref(), payload.content)?;

    tracing::info!("Detection requested: {} by user {}", request.modality, user.user_id);

    let response = state.pipeline.run(request).await?;
    Ok(Json(response))
}

/// Body failures are reported as such; absent fields are judged later
fn body_error(rejection: JsonRejection) -> AppError {
    tracing::debug!("Rejected detection body: {}", rejection);

    match rejection {
        JsonRejection::BytesRejection(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge
        }
        _ => AppError::InvalidBody,
    }
}
