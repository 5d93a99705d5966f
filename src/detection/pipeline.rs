//! Detection request pipeline
//!
//! normalize → classify → decode → persist → format, strictly in that order.
//! Every failure up to and including the oracle call aborts the request.
//! A failed history write is logged and the verdict is still returned.

use std::sync::Arc;
use uuid::Uuid;

use super::modality::Modality;
use super::normalizer::Normalizer;
use super::oracle::Oracle;
use super::parser;
use super::response::{self, DetectionResponse};
use super::store::DetectionStore;
use crate::models::{DetectionRecord, NewDetection};
use crate::{AppError, AppResult};

/// Largest page the history query will return
pub const MAX_HISTORY_LIMIT: i64 = 50;

/// One validated detection request
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub requester_id: Uuid,
    pub modality: Modality,
    pub raw_content: String,
}

impl DetectionRequest {
    /// Validate the inbound `type` and `content` fields
    pub fn new(requester_id: Uuid, kind: Option<&str>, content: Option<String>) -> AppResult<Self> {
        let kind = kind.filter(|k| !k.is_empty()).ok_or(AppError::MissingInput)?;
        let raw_content = content.filter(|c| !c.is_empty()).ok_or(AppError::MissingInput)?;
        let modality = kind.parse::<Modality>()?;

        Ok(Self { requester_id, modality, raw_content })
    }
}

pub struct DetectionPipeline {
    normalizer: Normalizer,
    oracle: Arc<dyn Oracle>,
    store: Arc<dyn DetectionStore>,
}

impl DetectionPipeline {
    pub fn new(normalizer: Normalizer, oracle: Arc<dyn Oracle>, store: Arc<dyn DetectionStore>) -> Self {
        Self { normalizer, oracle, store }
    }

    pub async fn run(&self, request: DetectionRequest) -> AppResult<DetectionResponse> {
        let DetectionRequest { requester_id, modality, raw_content } = request;

        let normalized = self.normalizer.normalize(modality, &raw_content).await?;

        let raw_output = self.oracle.classify(&normalized.prompt).await?;

        let decoded = parser::decode(&raw_output);
        if decoded.is_heuristic() {
            tracing::warn!("Using heuristic verdict for {} detection by {}", modality, requester_id);
        }
        let verdict = decoded.into_verdict();

        let detection = NewDetection::new(
            requester_id,
            modality,
            &raw_content,
            &normalized.processed_text,
            &verdict,
        );
        self.persist(detection).await;

        Ok(response::format(&verdict, &normalized.processed_text))
    }

    /// Best-effort history write. Failures are logged, never returned.
    async fn persist(&self, detection: NewDetection) -> Option<DetectionRecord> {
        let user_id = detection.user_id;
        match self.store.insert(detection).await {
            Ok(record) => {
                tracing::info!(
                    "Detection saved: {} ({}, {}) for user {}",
                    record.id, record.modality, record.label, user_id
                );
                Some(record)
            }
            Err(e) => {
                tracing::error!("Failed to save detection for user {}: {}", user_id, e);
                None
            }
        }
    }

    /// Most recent detections of one user, newest first
    pub async fn history(&self, user_id: Uuid, limit: i64) -> AppResult<Vec<DetectionRecord>> {
        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        self.store
            .recent_for_user(user_id, limit)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }
}
