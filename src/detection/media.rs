//! Voice and image payloads, and the engines that turn them into text
//!
//! Real transcription (Whisper-style) and OCR engines plug in behind
//! [`Transcriber`] and [`TextExtractor`]. The placeholders shipped here only
//! echo a prefix of the encoded upload.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

/// Number of encoded characters the placeholder engines echo back
const PLACEHOLDER_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("content is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("content is empty")]
    Empty,
    #[error("engine failed: {0}")]
    EngineFailed(String),
    #[error("no text could be extracted")]
    NoText,
}

/// A decoded voice or image upload
#[derive(Debug, Clone)]
pub struct MediaPayload {
    encoded: String,
    bytes: Vec<u8>,
}

impl MediaPayload {
    /// Decode standard base64, tolerating a `data:<mime>;base64,` prefix.
    pub fn from_base64(content: &str) -> Result<Self, MediaError> {
        let trimmed = content.trim();
        let encoded = match trimmed.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => trimmed,
        };

        if encoded.is_empty() {
            return Err(MediaError::Empty);
        }

        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| MediaError::InvalidEncoding(e.to_string()))?;

        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        Ok(Self {
            encoded: encoded.to_string(),
            bytes,
        })
    }

    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Speech-to-text for voice messages
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &MediaPayload) -> Result<String, MediaError>;
}

/// OCR for images
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image: &MediaPayload) -> Result<String, MediaError>;
}

#[derive(Debug, Default, Clone)]
pub struct PlaceholderTranscriber;

#[async_trait]
impl Transcriber for PlaceholderTranscriber {
    async fn transcribe(&self, audio: &MediaPayload) -> Result<String, MediaError> {
        Ok(format!("Transcribed: {}", preview(audio.encoded())))
    }
}

#[derive(Debug, Default, Clone)]
pub struct PlaceholderTextExtractor;

#[async_trait]
impl TextExtractor for PlaceholderTextExtractor {
    async fn extract_text(&self, image: &MediaPayload) -> Result<String, MediaError> {
        Ok(format!("OCR extracted text: {}", preview(image.encoded())))
    }
}

fn preview(encoded: &str) -> &str {
    match encoded.char_indices().nth(PLACEHOLDER_PREVIEW_CHARS) {
        Some((idx, _)) => &encoded[..idx],
        None => encoded,
    }
}
