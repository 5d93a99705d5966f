//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::detection::media::MediaError;
use crate::detection::oracle::OracleError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Request errors
    #[error("Type and content are required")]
    MissingInput,
    #[error("Invalid request body")]
    InvalidBody,
    #[error("Content too large")]
    PayloadTooLarge,
    #[error("Invalid type")]
    InvalidModality,
    #[error("Invalid media content: {0}")]
    InvalidMedia(String),
    #[error("Media processing failed: {0}")]
    MediaProcessing(String),

    // Auth errors
    #[error("User not authenticated")]
    Unauthenticated,
    #[error("Invalid email or password")]
    InvalidCredentials,

    // Oracle errors
    #[error("Rate limit exceeded. Please try again later.")]
    Throttled,
    #[error("AI usage limit reached. Please add credits to continue.")]
    QuotaExceeded,
    #[error("AI analysis failed: {0}")]
    OracleUnavailable(String),
    #[error("No response from AI")]
    EmptyOracleResponse,

    // Resource errors
    #[error("{0}")]
    AlreadyExists(String),

    // Validation errors
    #[error("{0}")]
    ValidationError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    // Generic errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingInput
            | AppError::InvalidBody
            | AppError::InvalidModality
            | AppError::InvalidMedia(_)
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::MediaProcessing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Throttled => StatusCode::TOO_MANY_REQUESTS,
            AppError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            AppError::OracleUnavailable(_) | AppError::EmptyOracleResponse => StatusCode::BAD_GATEWAY,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InvalidMedia(msg) => msg.clone(),
            AppError::MediaProcessing(msg) => {
                tracing::error!("Media processing error: {}", msg);
                "Could not extract text from the uploaded content".to_string()
            }
            AppError::OracleUnavailable(msg) => {
                tracing::error!("Oracle error: {}", msg);
                "AI analysis failed".to_string()
            }
            AppError::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                "Database error occurred".to_string()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.public_message(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthenticated
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<OracleError> for AppError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Throttled => AppError::Throttled,
            OracleError::QuotaExceeded => AppError::QuotaExceeded,
            OracleError::EmptyResponse => AppError::EmptyOracleResponse,
            OracleError::Unavailable(msg) => AppError::OracleUnavailable(msg),
        }
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::InvalidEncoding(msg) => AppError::InvalidMedia(msg),
            MediaError::Empty => AppError::InvalidMedia("Uploaded content is empty".to_string()),
            MediaError::EngineFailed(msg) => AppError::MediaProcessing(msg),
            MediaError::NoText => AppError::MediaProcessing("no text found".to_string()),
        }
    }
}
