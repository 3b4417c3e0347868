//! # Content Analysis
//!
//! Sentiment and toxicity scoring for single messages and small batches.
//! A successful single analysis can be attached to the stored message.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use futures_util::future::join_all;
use lib_ai::heuristics::{detect_language, extract_topics};
use lib_ai::AiClient;
use lib_core::dto::{
    AnalysisReport, AnalysisType, AnalyzeRequest, AnalyzeResponse, BatchAnalysisItem, BatchAnalyzeRequest,
    BatchAnalyzeResponse, BatchMessage,
};
use lib_core::model::ai::{ModerationResult, SentimentAnalysis};
use lib_core::model::chat::{MessageAnalysis, MessagePatch, Sentiment};
use lib_core::{AppError, ChatStore, Result};
use lib_utils::now_utc;
use tracing::{debug, instrument, warn};

use crate::handlers::{non_empty, JsonBody};

fn parse_analysis_type(value: &str) -> Result<AnalysisType> {
    AnalysisType::parse(value).ok_or_else(|| {
        AppError::InvalidInput("Invalid analysis type. Must be: sentiment, moderation, or all".to_string())
    })
}

async fn run_analysis(ai: &dyn AiClient, content: &str, kind: AnalysisType) -> lib_ai::Result<AnalysisReport> {
    let mut report = AnalysisReport::default();

    if kind.includes_sentiment() {
        report.sentiment = Some(ai.analyze_sentiment(content).await?.into());
    }
    if kind.includes_moderation() {
        report.moderation = Some(ai.moderate_content(content).await?);
    }
    Ok(report)
}

fn message_analysis(content: &str, report: &AnalysisReport) -> MessageAnalysis {
    let sentiment = report.sentiment.as_ref();

    MessageAnalysis {
        sentiment: sentiment.map_or(Sentiment::Neutral, |s| s.label.into()),
        confidence: sentiment.map_or(0.5, |s| s.confidence),
        toxicity: report.moderation.as_ref().map_or(0.0, |m| m.toxicity_score),
        topics: extract_topics(content),
        language: detect_language(content).to_string(),
        model_used: sentiment
            .map(|s| s.model.clone())
            .or_else(|| report.moderation.as_ref().map(|m| m.model.clone()))
            .unwrap_or_else(|| "analysis-api".to_string()),
        processed_at: now_utc(),
    }
}

/// `POST /api/ai/analyze` - `{ content, analysisType, messageId?, roomId? }`
#[instrument(skip_all)]
pub async fn analyze(
    State(store): State<ChatStore>,
    State(ai): State<Arc<dyn AiClient>>,
    JsonBody(req): JsonBody<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    let (Some(content), Some(analysis_type)) = (non_empty(req.content), non_empty(req.analysis_type)) else {
        return Err(AppError::InvalidInput("Content and analysisType are required".to_string()));
    };
    let kind = parse_analysis_type(&analysis_type)?;

    let report = match run_analysis(ai.as_ref(), &content, kind).await {
        Ok(report) => report,
        Err(e) => {
            warn!("[ANALYSIS] falling back: {}", e);
            return Ok(Json(AnalyzeResponse {
                success: false,
                analysis: AnalysisReport::fallback(),
                error: Some("AI analysis service unavailable, using fallback".to_string()),
                timestamp: now_utc(),
            }));
        }
    };

    if let (Some(message_id), Some(room_id)) = (non_empty(req.message_id), non_empty(req.room_id)) {
        let patch = MessagePatch::analysis(message_analysis(&content, &report));
        if store.update_message(&message_id, &room_id, patch).is_some() {
            debug!("[ANALYSIS] attached to {}", message_id);
        }
    }

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis: report,
        error: None,
        timestamp: now_utc(),
    }))
}

async fn analyze_item(ai: &dyn AiClient, message: BatchMessage, kind: AnalysisType) -> BatchAnalysisItem {
    let result = async {
        let sentiment = if kind.includes_sentiment() {
            Some(ai.analyze_sentiment(&message.content).await?)
        } else {
            None
        };
        let moderation = if kind.includes_moderation() {
            Some(ai.moderate_content(&message.content).await?)
        } else {
            None
        };
        Ok::<_, lib_ai::AiError>((sentiment, moderation))
    }
    .await;

    match result {
        Ok((sentiment, moderation)) => BatchAnalysisItem {
            message_id: message.id,
            sentiment,
            moderation,
            error: None,
        },
        Err(e) => {
            warn!("[ANALYSIS] batch item {} failed: {}", message.id, e);
            BatchAnalysisItem {
                message_id: message.id,
                sentiment: Some(SentimentAnalysis::fallback()),
                moderation: Some(ModerationResult::fallback()),
                error: Some("Analysis failed".to_string()),
            }
        }
    }
}

/// `PUT /api/ai/analyze` - `{ messages: [{ id, content }], analysisType? }`
///
/// Up to ten messages, analysed concurrently. Failures fall back per item.
#[instrument(skip_all)]
pub async fn batch_analyze(
    State(ai): State<Arc<dyn AiClient>>,
    JsonBody(req): JsonBody<BatchAnalyzeRequest>,
) -> Result<Json<BatchAnalyzeResponse>> {
    let messages = req.messages.filter(|m| !m.is_empty()).ok_or_else(|| {
        AppError::InvalidInput("Messages array is required and cannot be empty".to_string())
    })?;
    if messages.len() > BatchAnalyzeRequest::MAX_MESSAGES {
        return Err(AppError::InvalidInput("Maximum 10 messages can be analyzed at once".to_string()));
    }
    let kind = match non_empty(req.analysis_type) {
        Some(value) => parse_analysis_type(&value)?,
        None => AnalysisType::All,
    };

    let results = join_all(messages.into_iter().map(|m| analyze_item(ai.as_ref(), m, kind))).await;

    Ok(Json(BatchAnalyzeResponse {
        success: true,
        results,
        timestamp: now_utc(),
    }))
}

// endregion: --- Tests
