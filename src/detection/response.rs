//! Caller-facing result payload

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::parser::{Label, Verdict};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub label: Label,
    pub score: f64,
    pub reasons: Vec<String>,
    pub processed_text: String,
    /// The verdict's indicators
    pub metadata: Map<String, Value>,
}

pub fn format(verdict: &Verdict, processed_text: &str) -> DetectionResponse {
    DetectionResponse {
        label: verdict.label,
        score: verdict.score,
        reasons: verdict.reasons.clone(),
        processed_text: processed_text.to_string(),
        metadata: verdict.indicators.clone(),
    }
}
