//! Input normalization and prompt construction

use std::sync::Arc;

use super::media::{MediaError, MediaPayload, TextExtractor, Transcriber};
use super::modality::Modality;
use crate::{AppError, AppResult};

/// Detection taxonomy and scoring rubric sent as the system message of every oracle call
pub const SYSTEM_INSTRUCTIONS: &str = r#"You are an advanced spam detection AI. Analyze messages for spam, phishing, scams, and fraudulent intent.

Provide your analysis in JSON format with these fields:
{
  "label": "spam" | "not_spam" | "suspicious",
  "score": 0.0-1.0 (confidence score),
  "reasons": ["reason 1", "reason 2", ...],
  "indicators": {
    "keywords": ["detected keywords"],
    "urgency_language": true/false,
    "suspicious_links": true/false,
    "financial_request": true/false,
    "impersonation": true/false
  }
}

Be thorough in your analysis and look for:
- Urgency and pressure tactics
- Requests for personal/financial information
- Too-good-to-be-true offers
- Suspicious URLs and links
- Poor grammar/spelling (common in scams)
- Impersonation attempts
- Cryptocurrency/investment schemes
- Prize/lottery scams
- Phishing attempts"#;

/// System and user messages for one oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    pub system_instructions: &'static str,
    pub user_prompt: String,
}

impl AnalysisPrompt {
    fn new(user_prompt: String) -> Self {
        Self {
            system_instructions: SYSTEM_INSTRUCTIONS,
            user_prompt,
        }
    }
}

/// Result of normalizing one request
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub processed_text: String,
    pub prompt: AnalysisPrompt,
}

/// Turns raw content of any modality into analyzable text plus a prompt
#[derive(Clone)]
pub struct Normalizer {
    transcriber: Arc<dyn Transcriber>,
    text_extractor: Arc<dyn TextExtractor>,
}

impl Normalizer {
    pub fn new(transcriber: Arc<dyn Transcriber>, text_extractor: Arc<dyn TextExtractor>) -> Self {
        Self { transcriber, text_extractor }
    }

    pub async fn normalize(&self, modality: Modality, raw_content: &str) -> AppResult<NormalizedInput> {
        if raw_content.trim().is_empty() {
            return Err(AppError::MissingInput);
        }

        let (processed_text, user_prompt) = match modality {
            Modality::Text => (raw_content.to_string(), text_prompt(raw_content)),
            Modality::Voice => {
                let audio = MediaPayload::from_base64(raw_content)?;
                let text = non_blank(self.transcriber.transcribe(&audio).await?)?;
                let prompt = voice_prompt(&text);
                (text, prompt)
            }
            Modality::Image => {
                let image = MediaPayload::from_base64(raw_content)?;
                let text = non_blank(self.text_extractor.extract_text(&image).await?)?;
                let prompt = image_prompt(&text);
                (text, prompt)
            }
            Modality::Link => (raw_content.to_string(), link_prompt(raw_content)),
        };

        Ok(NormalizedInput {
            processed_text,
            prompt: AnalysisPrompt::new(user_prompt),
        })
    }
}

fn non_blank(text: String) -> Result<String, MediaError> {
    if text.trim().is_empty() {
        Err(MediaError::NoText)
    } else {
        Ok(text)
    }
}

fn text_prompt(text: &str) -> String {
    format!("Analyze this message for spam, phishing, and scam indicators:\n\n\"{}\"", text)
}

fn voice_prompt(transcript: &str) -> String {
    format!(
        "Analyze this transcribed voice message for spam, phishing, and scam indicators:\n\n\"{}\"",
        transcript
    )
}

fn image_prompt(extracted: &str) -> String {
    format!(
        "Analyze this text extracted from an image for spam, phishing, and scam indicators:\n\n\"{}\"",
        extracted
    )
}

// The URL is only described to the oracle, never fetched.
fn link_prompt(url: &str) -> String {
    format!(
        "Analyze this URL for phishing, malicious content, and suspicious patterns:\n\n\
         URL: {}\n\n\
         Check for: shortened URLs, suspicious TLDs, typosquatting, IP addresses in URLs, \
         and known phishing patterns.",
        url
    )
}
