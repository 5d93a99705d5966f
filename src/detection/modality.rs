//! Input modalities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AppError;

/// The four kinds of content the pipeline accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Voice,
    Image,
    Link,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Voice => "voice",
            Self::Image => "image",
            Self::Link => "link",
        }
    }

    /// Voice and image uploads are never written to history, only their extracted text.
    pub fn retains_raw_content(&self) -> bool {
        match self {
            Self::Text | Self::Link => true,
            Self::Voice | Self::Image => false,
        }
    }
}

impl FromStr for Modality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "voice" => Ok(Self::Voice),
            "image" => Ok(Self::Image),
            "link" => Ok(Self::Link),
            _ => Err(AppError::InvalidModality),
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
