//! Detection history store

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Detection, DetectionRecord, NewDetection};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Append-only record store queried by recency.
///
/// Each `insert` is atomic on its own; concurrent inserts have no ordering
/// relationship beyond the store's insertion order.
#[async_trait]
pub trait DetectionStore: Send + Sync {
    async fn insert(&self, detection: NewDetection) -> Result<DetectionRecord, StoreError>;

    /// Newest first
    async fn recent_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<DetectionRecord>, StoreError>;
}

pub struct PgDetectionStore {
    pool: PgPool,
}

impl PgDetectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DetectionStore for PgDetectionStore {
    async fn insert(&self, detection: NewDetection) -> Result<DetectionRecord, StoreError> {
        Ok(Detection::create(&self.pool, &detection).await?)
    }

    async fn recent_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<DetectionRecord>, StoreError> {
        Ok(Detection::list_recent_by_user(&self.pool, user_id, limit).await?)
    }
}

/// Process-local store, for tests and database-less development runs
#[derive(Default)]
pub struct MemoryDetectionStore {
    records: RwLock<Vec<DetectionRecord>>,
}

impl MemoryDetectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// All records in insertion order
    pub async fn snapshot(&self) -> Vec<DetectionRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl DetectionStore for MemoryDetectionStore {
    async fn insert(&self, detection: NewDetection) -> Result<DetectionRecord, StoreError> {
        let record = detection.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent_for_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<DetectionRecord>, StoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let records = self.records.read().await;
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
