//! Classification oracle client
//!
//! One chat-completion round trip per detection. Nothing here retries:
//! throttling and quota errors go straight back to the caller.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::normalizer::AnalysisPrompt;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle rate limit exceeded")]
    Throttled,
    #[error("oracle quota exhausted")]
    QuotaExceeded,
    #[error("oracle returned no content")]
    EmptyResponse,
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Remote classifier returning free text
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn classify(&self, prompt: &AnalysisPrompt) -> Result<String, OracleError>;
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Oracle reached over HTTPS with a bearer key
pub struct HttpOracle {
    http_client: Client,
    url: String,
    api_key: String,
    model: String,
}

impl HttpOracle {
    pub fn new(url: &str, api_key: &str, model: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            url: url.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.oracle_url,
            &config.oracle_api_key,
            &config.oracle_model,
            Duration::from_secs(config.oracle_timeout_secs),
        )
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn classify(&self, prompt: &AnalysisPrompt) -> Result<String, OracleError> {
        let request = build_request(&self.model, prompt);

        let response = self.http_client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Unavailable("request timed out".to_string())
                } else {
                    OracleError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Oracle error ({}): {}", status.as_u16(), error_text);
            return Err(map_status(status));
        }

        let data: ChatResponse = response.json().await
            .map_err(|e| OracleError::Unavailable(format!("undecodable response: {}", e)))?;

        extract_content(data)
    }
}

fn build_request<'a>(model: &'a str, prompt: &'a AnalysisPrompt) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage { role: "system", content: prompt.system_instructions },
            ChatMessage { role: "user", content: &prompt.user_prompt },
        ],
    }
}

fn map_status(status: StatusCode) -> OracleError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => OracleError::Throttled,
        StatusCode::PAYMENT_REQUIRED => OracleError::QuotaExceeded,
        other => OracleError::Unavailable(format!("HTTP {}", other.as_u16())),
    }
}

fn extract_content(data: ChatResponse) -> Result<String, OracleError> {
    data.choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(OracleError::EmptyResponse)
}
