//! # AI Client Trait
//!
//! The boundary between the HTTP handlers and the hosted inference service.
//!
//! Handlers hold an `Arc<dyn AiClient>`, so tests can swap the
//! [`HuggingFaceClient`](crate::HuggingFaceClient) for a scripted
//! implementation.

use async_trait::async_trait;
use lib_core::model::ai::{
    AiRequest, AiResponse, ModerationResult, SentimentAnalysis, TranslationRequest,
    TranslationResponse,
};

use crate::error::Result;

/// Text generation and analysis backed by a hosted model provider.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Generate a reply with the catalog model named in `request.model`.
    ///
    /// Fails with [`AiError::UnknownModel`](crate::AiError::UnknownModel) for ids
    /// missing from the catalog.
    async fn generate_text(&self, request: &AiRequest) -> Result<AiResponse>;

    /// Translate `request.text` into `request.target_language`.
    async fn translate_text(&self, request: &TranslationRequest) -> Result<TranslationResponse>;

    /// Classify text as positive, negative or neutral.
    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentAnalysis>;

    /// Score text for toxicity.
    async fn moderate_content(&self, text: &str) -> Result<ModerationResult>;

    /// Cheap reachability probe. Any failure yields `false`.
    async fn test_connection(&self) -> bool;
}
