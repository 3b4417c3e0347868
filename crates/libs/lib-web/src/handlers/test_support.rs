//! Shared fixtures for handler tests: a scripted [`AiClient`] and request
//! helpers driving the real router.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use lib_ai::{AiClient, AiError};
use lib_core::model::ai::{
    AiRequest, AiResponse, ModerationResult, SentimentAnalysis, SentimentLabel, TokenUsage,
    TranslationRequest, TranslationResponse,
};
use lib_core::{ChatStore, Config, StoreConfig};
use serde_json::Value;
use tower::ServiceExt;

use crate::server::{create_router, AppState};

/// In-process AI client: answers every call, or fails every call.
#[derive(Default)]
pub struct ScriptedAi {
    fail: bool,
    /// Models of every `generate_text` call, in order
    pub requested_models: Mutex<Vec<String>>,
}

impl ScriptedAi {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    fn check(&self) -> Result<(), AiError> {
        if self.fail {
            Err(AiError::Api {
                status: 503,
                body: "Service overloaded".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AiClient for ScriptedAi {
    async fn generate_text(&self, request: &AiRequest) -> Result<AiResponse, AiError> {
        self.requested_models.lock().unwrap().push(request.model.clone());
        self.check()?;

        Ok(AiResponse {
            id: lib_utils::generate_prefixed_id("ai"),
            content: "Assistant:  Happy   to help!".to_string(),
            model: request.model.clone(),
            confidence: 0.8,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 4,
                total_tokens: 14,
            },
            processing_time: 5,
            timestamp: lib_utils::now_utc(),
        })
    }

    async fn translate_text(&self, request: &TranslationRequest) -> Result<TranslationResponse, AiError> {
        self.check()?;

        Ok(TranslationResponse {
            original_text: request.text.clone(),
            translated_text: format!("[{}] {}", request.target_language, request.text),
            source_language: request.source_language.clone().unwrap_or_else(|| "auto".to_string()),
            target_language: request.target_language.clone(),
            confidence: 0.85,
            model: "scripted-translator".to_string(),
        })
    }

    async fn analyze_sentiment(&self, _text: &str) -> Result<SentimentAnalysis, AiError> {
        self.check()?;

        Ok(SentimentAnalysis {
            label: SentimentLabel::Positive,
            score: 0.9,
            model: "scripted-sentiment".to_string(),
        })
    }

    async fn moderate_content(&self, _text: &str) -> Result<ModerationResult, AiError> {
        self.check()?;

        Ok(ModerationResult::from_score(0.1, "scripted-moderation"))
    }

    async fn test_connection(&self) -> bool {
        !self.fail
    }
}

/// Router over a seeded store, plus the store itself for assertions.
pub fn test_app(ai: Arc<ScriptedAi>) -> (Router, ChatStore) {
    let store = ChatStore::with_sample_data(StoreConfig::default());
    let state = AppState {
        store: store.clone(),
        ai,
        config: Config::default(),
    };

    (create_router(state), store)
}

/// Send a request and decode the JSON answer (`Value::Null` for empty bodies).
pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}
