//! # AI Data Transfer Objects
//!
//! Bodies of the `/api/ai/*` endpoints: chat, status, analysis, suggestions
//! and translation.
//!
//! AI failures never surface as HTTP errors from these endpoints. The handlers
//! answer 200 with `success: false` and a fallback payload instead, so every
//! response type here carries a `success` flag.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ai::{AiResponse, ModerationResult, SentimentAnalysis, SentimentLabel, TranslationResponse};
use crate::model::chat::Message;

// region:    --- Chat

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatRequest {
    pub message: Option<String>,
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    /// Catalog id overriding the room and user defaults
    pub model: Option<String>,
}

/// Successful generation: the raw response and the stored chat message.
#[derive(Debug, Clone, Serialize)]
pub struct AiChatResponse {
    pub success: bool,
    pub response: AiResponse,
    pub message: Message,
}

/// Failed generation: the apology message that was stored instead.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatFallback {
    pub success: bool,
    pub error: String,
    pub fallback_message: Message,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiStatusQuery {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelAvailability {
    pub available: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `GET /api/ai/chat` without a model.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiServiceStatus {
    /// `online` or `offline`
    pub status: String,
    pub models: BTreeMap<String, ModelAvailability>,
    pub last_checked: DateTime<Utc>,
}

/// `GET /api/ai/chat?model=..`
#[derive(Debug, Clone, Serialize)]
pub struct ModelProbe {
    pub model: String,
    pub available: bool,
    pub tested: DateTime<Utc>,
}

// endregion: --- Chat

// region:    --- Analysis

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Sentiment,
    Moderation,
    All,
}

impl AnalysisType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sentiment" => Some(AnalysisType::Sentiment),
            "moderation" => Some(AnalysisType::Moderation),
            "all" => Some(AnalysisType::All),
            _ => None,
        }
    }

    pub fn includes_sentiment(self) -> bool {
        matches!(self, AnalysisType::Sentiment | AnalysisType::All)
    }

    pub fn includes_moderation(self) -> bool {
        matches!(self, AnalysisType::Moderation | AnalysisType::All)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub content: Option<String>,
    pub analysis_type: Option<String>,
    pub message_id: Option<String>,
    pub room_id: Option<String>,
}

/// Sentiment as reported by the analyze endpoint; `confidence` mirrors
/// `score` except in the fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReport {
    pub label: SentimentLabel,
    pub score: f64,
    pub confidence: f64,
    pub model: String,
}

impl From<SentimentAnalysis> for SentimentReport {
    fn from(s: SentimentAnalysis) -> Self {
        Self {
            label: s.label,
            score: s.score,
            confidence: s.score,
            model: s.model,
        }
    }
}

impl SentimentReport {
    pub fn fallback() -> Self {
        let base = Self::from(SentimentAnalysis::fallback());
        Self {
            confidence: 0.1,
            ..base
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationResult>,
}

impl AnalysisReport {
    /// Neutral, non-toxic result served when the AI service fails.
    pub fn fallback() -> Self {
        Self {
            sentiment: Some(SentimentReport::fallback()),
            moderation: Some(ModerationResult::fallback()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchMessage {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalyzeRequest {
    pub messages: Option<Vec<BatchMessage>>,
    pub analysis_type: Option<String>,
}

impl BatchAnalyzeRequest {
    pub const MAX_MESSAGES: usize = 10;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalysisItem {
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchAnalyzeResponse {
    pub success: bool,
    pub results: Vec<BatchAnalysisItem>,
    pub timestamp: DateTime<Utc>,
}

// endregion: --- Analysis

// region:    --- Suggestions

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub input: Option<String>,
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    /// Recent message contents; the room's last messages are used when absent
    pub context: Option<Vec<String>>,
}

impl SuggestRequest {
    pub const MAX_SUGGESTIONS: usize = 5;
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartReplyQuery {
    pub room_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplySource {
    pub message_id: String,
    pub content: String,
    pub from: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartReplyResponse {
    pub success: bool,
    pub smart_replies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub based_on: Option<ReplySource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// endregion: --- Suggestions

// region:    --- Translation

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: Option<String>,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslateResponse {
    pub success: bool,
    pub translation: TranslationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchTranslateRequest {
    pub texts: Option<Vec<String>>,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
    pub user_id: Option<String>,
}

impl BatchTranslateRequest {
    pub const MAX_TEXTS: usize = 5;
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchTranslationItem {
    pub index: usize,
    #[serde(flatten)]
    pub translation: TranslationResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchTranslateResponse {
    pub success: bool,
    pub translations: Vec<BatchTranslationItem>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: Vec<Language>,
    pub total: usize,
}

// endregion: --- Translation

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_type_parse() {
        assert_eq!(AnalysisType::parse("all"), Some(AnalysisType::All));
        assert!(AnalysisType::parse("toxicity").is_none());
        assert!(AnalysisType::Sentiment.includes_sentiment());
        assert!(!AnalysisType::Sentiment.includes_moderation());
    }

    #[test]
    fn test_fallback_report_shape() {
        let value = serde_json::to_value(AnalysisReport::fallback()).unwrap();

        assert_eq!(value["sentiment"]["label"], "NEUTRAL");
        assert_eq!(value["sentiment"]["score"], 0.5);
        assert_eq!(value["sentiment"]["confidence"], 0.1);
        assert_eq!(value["moderation"]["isToxic"], false);
        assert_eq!(value["moderation"]["categories"]["identity_hate"], 0.0);
    }
}
// endregion: --- Tests
