//! # AI Exchange Types
//!
//! Requests to and results from the hosted inference service. They live in the
//! core crate because the store turns an [`AiResponse`] into a chat message and
//! the HTTP layer returns the analysis results verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A text generation request for one of the catalog chat models.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    /// Catalog id (e.g. `blenderbot`), not the upstream model id
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub user_id: String,
    pub room_id: String,
    #[serde(default)]
    pub context: Vec<String>,
}

/// Token accounting, estimated at four characters per token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub confidence: f64,
    pub usage: TokenUsage,
    /// Wall time of the upstream call in milliseconds
    pub processing_time: u64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    pub target_language: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    pub original_text: String,
    pub translated_text: String,
    pub source_language: String,
    pub target_language: String,
    pub confidence: f64,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Map an upstream label (`positive`, `LABEL_NEG`, ...) by substring.
    pub fn from_upstream(label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("pos") {
            SentimentLabel::Positive
        } else if label.contains("neg") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl From<SentimentLabel> for super::chat::Sentiment {
    fn from(label: SentimentLabel) -> Self {
        match label {
            SentimentLabel::Positive => super::chat::Sentiment::Positive,
            SentimentLabel::Negative => super::chat::Sentiment::Negative,
            SentimentLabel::Neutral => super::chat::Sentiment::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub label: SentimentLabel,
    pub score: f64,
    pub model: String,
}

impl SentimentAnalysis {
    /// Result used when the sentiment model could not be reached.
    pub fn fallback() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.5,
            model: "fallback".to_string(),
        }
    }
}

/// Per-category toxicity scores. Wire names are snake_case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ToxicityCategories {
    pub toxic: f64,
    pub severe_toxic: f64,
    pub obscene: f64,
    pub threat: f64,
    pub insult: f64,
    pub identity_hate: f64,
}

impl ToxicityCategories {
    /// Derive the categories from the single toxicity score.
    pub fn from_score(score: f64) -> Self {
        Self {
            toxic: score,
            severe_toxic: score * 0.8,
            obscene: score * 0.6,
            threat: score * 0.4,
            insult: score * 0.7,
            identity_hate: score * 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationResult {
    pub is_toxic: bool,
    pub toxicity_score: f64,
    pub categories: ToxicityCategories,
    pub model: String,
}

impl ModerationResult {
    /// Scores above this are flagged as toxic.
    pub const TOXIC_THRESHOLD: f64 = 0.7;

    pub fn from_score(score: f64, model: impl Into<String>) -> Self {
        Self {
            is_toxic: score > Self::TOXIC_THRESHOLD,
            toxicity_score: score,
            categories: ToxicityCategories::from_score(score),
            model: model.into(),
        }
    }

    pub fn fallback() -> Self {
        Self::from_score(0.0, "fallback")
    }
}

// endregion: --- Tests
