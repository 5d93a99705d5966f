//! Detection history model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use crate::detection::modality::Modality;
use crate::detection::parser::{Label, Verdict};

/// One persisted detection. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub modality: Modality,
    /// Withheld (null) for voice and image uploads
    pub content: Option<String>,
    pub processed_text: String,
    pub label: Label,
    pub score: f64,
    pub reasons: Vec<String>,
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

/// Row to insert for a finished detection
#[derive(Debug, Clone, PartialEq)]
pub struct NewDetection {
    pub user_id: Uuid,
    pub modality: Modality,
    pub content: Option<String>,
    pub processed_text: String,
    pub label: Label,
    pub score: f64,
    pub reasons: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl NewDetection {
    pub fn new(
        user_id: Uuid,
        modality: Modality,
        raw_content: &str,
        processed_text: &str,
        verdict: &Verdict,
    ) -> Self {
        let content = modality
            .retains_raw_content()
            .then(|| raw_content.to_string());

        Self {
            user_id,
            modality,
            content,
            processed_text: processed_text.to_string(),
            label: verdict.label,
            score: verdict.score,
            reasons: verdict.reasons.clone(),
            metadata: verdict.indicators.clone(),
        }
    }

    /// Materialize as a record with a fresh id and timestamp
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> DetectionRecord {
        DetectionRecord {
            id,
            user_id: self.user_id,
            modality: self.modality,
            content: self.content,
            processed_text: self.processed_text,
            label: self.label,
            score: self.score,
            reasons: self.reasons,
            metadata: self.metadata,
            created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct DetectionRow {
    id: Uuid,
    user_id: Uuid,
    #[sqlx(rename = "type")]
    modality: String,
    content: Option<String>,
    processed_text: String,
    label: String,
    score: f64,
    reasons: Json<Vec<String>>,
    metadata: Json<Map<String, Value>>,
    created_at: DateTime<Utc>,
}

impl DetectionRow {
    fn into_record(self) -> Result<DetectionRecord, sqlx::Error> {
        let DetectionRow { id, user_id, modality, content, processed_text, label, score, reasons, metadata, created_at } = self;

        let parsed_modality = modality.parse::<Modality>().map_err(|_| {
            sqlx::Error::Decode(format!("detection {} has unknown type '{}'", id, modality).into())
        })?;
        let parsed_label = Label::parse_lenient(&label).ok_or_else(|| {
            sqlx::Error::Decode(format!("detection {} has unknown label '{}'", id, label).into())
        })?;

        Ok(DetectionRecord {
            id,
            user_id,
            modality: parsed_modality,
            content,
            processed_text,
            label: parsed_label,
            score,
            reasons: reasons.0,
            metadata: metadata.0,
            created_at,
        })
    }
}

pub struct Detection;

impl Detection {
    pub async fn create(pool: &PgPool, data: &NewDetection) -> Result<DetectionRecord, sqlx::Error> {
        let row = sqlx::query_as::<_, DetectionRow>(
            r#"
            INSERT INTO detections (user_id, type, content, processed_text, label, score, reasons, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#
        )
        .bind(data.user_id)
        .bind(data.modality.as_str())
        .bind(&data.content)
        .bind(&data.processed_text)
        .bind(data.label.as_str())
        .bind(data.score)
        .bind(Json(&data.reasons))
        .bind(Json(&data.metadata))
        .fetch_one(pool)
        .await?;

        row.into_record()
    }

    pub async fn list_recent_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64
    ) -> Result<Vec<DetectionRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, DetectionRow>(
            r#"
            SELECT * FROM detections
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        rows.into_iter()
            .map(DetectionRow::into_record)
            .collect()
    }
}
