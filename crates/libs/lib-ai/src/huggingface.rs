//! # Hugging Face Inference Client
//!
//! [`AiClient`] implementation over the Hugging Face Inference API.
//!
//! Every call is a single `POST {base_url}/{model_id}` with a bearer token and
//! a JSON body. Non-2xx answers become [`AiError::Api`]. There are no retries.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use lib_core::config::Config;
use lib_core::model::ai::{
    AiRequest, AiResponse, ModerationResult, SentimentAnalysis, SentimentLabel, TokenUsage,
    TranslationRequest, TranslationResponse,
};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::client::AiClient;
use crate::error::{AiError, Result};
use crate::models::get_model_by_id;
use crate::prompt::estimate_tokens;

pub const TRANSLATION_MODEL: &str = "Helsinki-NLP/opus-mt-en-ROMANCE";
pub const SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
pub const MODERATION_MODEL: &str = "martin-ha/toxic-comment-model";
const PROBE_MODEL: &str = "gpt2";

const GENERATION_CONFIDENCE: f64 = 0.8;
const TRANSLATION_CONFIDENCE: f64 = 0.85;

/// HTTP client for the Hugging Face Inference API.
#[derive(Clone)]
pub struct HuggingFaceClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl HuggingFaceClient {
    /// Create a new client with a request timeout.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.huggingface_api_key.clone(),
            config.huggingface_api_url.clone(),
            config.ai_request_timeout(),
        )
    }

    async fn post(&self, model_id: &str, payload: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, model_id);
        debug!("[HF] POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[HF] {} answered {}: {}", model_id, status, body);
            return Err(AiError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.to_string()))
    }
}

// region: --- Response parsing

/// First string found under any of `keys`, looking into `value[0]` for arrays.
fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    let target = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };

    keys.iter()
        .filter_map(|k| target.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn parse_generated_text(value: &Value) -> String {
    first_text(value, &["generated_text", "text"]).unwrap_or_default()
}

pub(crate) fn parse_translation(value: &Value) -> Option<String> {
    first_text(value, &["translation_text", "text"])
}

/// Label scores of a classifier response shaped `[[{label, score}, ...]]`.
fn label_scores(value: &Value) -> Option<Vec<(String, f64)>> {
    let scores = value.as_array()?.first()?.as_array()?;

    Some(
        scores
            .iter()
            .filter_map(|item| {
                let label = item.get("label")?.as_str()?;
                let score = item.get("score")?.as_f64()?;
                Some((label.to_string(), score))
            })
            .collect(),
    )
}

/// Highest scoring label, mapped onto the three sentiment classes.
pub(crate) fn parse_sentiment(value: &Value) -> Option<(SentimentLabel, f64)> {
    label_scores(value)?
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, score)| (SentimentLabel::from_upstream(&label), score))
}

/// Score of the `TOXIC` label, zero when absent.
pub(crate) fn parse_toxicity(value: &Value) -> f64 {
    label_scores(value)
        .and_then(|scores| scores.into_iter().find(|(label, _)| label == "TOXIC"))
        .map(|(_, score)| score)
        .unwrap_or(0.0)
}

// endregion: --- Response parsing

#[async_trait]
impl AiClient for HuggingFaceClient {
    #[instrument(skip_all, fields(model = %request.model))]
    async fn generate_text(&self, request: &AiRequest) -> Result<AiResponse> {
        let started = Instant::now();
        let model = get_model_by_id(&request.model)
            .ok_or_else(|| AiError::UnknownModel(request.model.clone()))?;

        let payload = json!({
            "inputs": request.prompt,
            "parameters": {
                "max_new_tokens": request.max_tokens.unwrap_or(model.max_tokens),
                "temperature": request.temperature.or(model.temperature).unwrap_or(0.7),
                "return_full_text": false,
            },
        });

        let result = self.post(model.model_id, &payload).await?;
        let generated = parse_generated_text(&result);

        let prompt_tokens = estimate_tokens(&request.prompt);
        let completion_tokens = estimate_tokens(&generated);
        let total_tokens = estimate_tokens(&format!("{}{}", request.prompt, generated));

        debug!("[HF] generated {} chars in {:?}", generated.len(), started.elapsed());

        Ok(AiResponse {
            id: lib_utils::generate_prefixed_id("ai"),
            content: generated.trim().to_string(),
            model: request.model.clone(),
            confidence: GENERATION_CONFIDENCE,
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens,
            },
            processing_time: started.elapsed().as_millis() as u64,
            timestamp: lib_utils::now_utc(),
        })
    }

    #[instrument(skip_all, fields(target = %request.target_language))]
    async fn translate_text(&self, request: &TranslationRequest) -> Result<TranslationResponse> {
        let result = self
            .post(TRANSLATION_MODEL, &json!({ "inputs": request.text }))
            .await?;

        Ok(TranslationResponse {
            original_text: request.text.clone(),
            translated_text: parse_translation(&result).unwrap_or_else(|| request.text.clone()),
            source_language: request
                .source_language
                .clone()
                .unwrap_or_else(|| "auto".to_string()),
            target_language: request.target_language.clone(),
            confidence: TRANSLATION_CONFIDENCE,
            model: TRANSLATION_MODEL.to_string(),
        })
    }

    async fn analyze_sentiment(&self, text: &str) -> Result<SentimentAnalysis> {
        let result = self.post(SENTIMENT_MODEL, &json!({ "inputs": text })).await?;

        let (label, score) = parse_sentiment(&result).unwrap_or_else(|| {
            debug!("[HF] unrecognised sentiment response, defaulting to neutral");
            (SentimentLabel::Neutral, 0.5)
        });

        Ok(SentimentAnalysis {
            label,
            score,
            model: SENTIMENT_MODEL.to_string(),
        })
    }

    async fn moderate_content(&self, text: &str) -> Result<ModerationResult> {
        let result = self.post(MODERATION_MODEL, &json!({ "inputs": text })).await?;

        Ok(ModerationResult::from_score(parse_toxicity(&result), MODERATION_MODEL))
    }

    async fn test_connection(&self) -> bool {
        let payload = json!({ "inputs": "Hello", "parameters": { "max_new_tokens": 1 } });

        match self.post(PROBE_MODEL, &payload).await {
            Ok(value) => !value.is_null(),
            Err(e) => {
                warn!("[HF] connection test failed: {}", e);
                false
            }
        }
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};

    /// Serve a fake inference API on an ephemeral port.
    async fn spawn_upstream() -> String {
        async fn handle(Path(model): Path<String>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
            let input = body["inputs"].as_str().unwrap_or_default().to_string();
            match model.as_str() {
                "gpt2-large" => (StatusCode::OK, Json(json!([{ "generated_text": "  Hello there  " }]))),
                "toxic-comment-model" => (
                    StatusCode::OK,
                    Json(json!([[{ "label": "non-toxic", "score": 0.1 }, { "label": "TOXIC", "score": 0.9 }]])),
                ),
                "twitter-roberta-base-sentiment-latest" if input == "odd" => (StatusCode::OK, Json(json!({ "weird": true }))),
                "twitter-roberta-base-sentiment-latest" => (
                    StatusCode::OK,
                    Json(json!([[{ "label": "negative", "score": 0.2 }, { "label": "positive", "score": 0.7 }]])),
                ),
                _ => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "error": "Model is currently loading" }))),
            }
        }

        let app = Router::new()
            .route("/{model}", post(handle))
            .route("/{org}/{model}", post(|Path((_, model)): Path<(String, String)>, body: Json<Value>| handle(Path(model), body)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    fn client(base_url: String) -> HuggingFaceClient {
        HuggingFaceClient::new("test-key", base_url, Duration::from_secs(5)).unwrap()
    }

    fn request(model: &str) -> AiRequest {
        AiRequest {
            model: model.to_string(),
            prompt: "User: hi\nAssistant:".to_string(),
            max_tokens: None,
            temperature: None,
            user_id: "user1".to_string(),
            room_id: "general".to_string(),
            context: Vec::new(),
        }
    }

    #[test]
    fn test_parse_generated_text_shapes() {
        assert_eq!(parse_generated_text(&json!([{ "generated_text": "a" }])), "a");
        assert_eq!(parse_generated_text(&json!({ "text": "b" })), "b");
        assert_eq!(parse_generated_text(&json!({ "other": 1 })), "");
    }

    #[test]
    fn test_parse_sentiment_picks_highest() {
        let value = json!([[{ "label": "LABEL_0", "score": 0.1 }, { "label": "LABEL_NEG", "score": 0.8 }]]);
        assert_eq!(parse_sentiment(&value), Some((SentimentLabel::Negative, 0.8)));
        assert_eq!(parse_sentiment(&json!({ "error": "x" })), None);
    }

    #[test]
    fn test_parse_toxicity_defaults_to_zero() {
        assert_eq!(parse_toxicity(&json!([[{ "label": "non-toxic", "score": 0.9 }]])), 0.0);
        assert_eq!(parse_toxicity(&json!([])), 0.0);
    }

    #[tokio::test]
    async fn test_generate_text_against_upstream() {
        let hf = client(spawn_upstream().await);

        let response = hf.generate_text(&request("gpt2-large")).await.unwrap();

        assert_eq!(response.content, "Hello there");
        assert_eq!(response.model, "gpt2-large");
        assert_eq!(response.confidence, 0.8);
        assert!(response.id.starts_with("ai_"));
        assert_eq!(response.usage.prompt_tokens, 5);
    }

    #[tokio::test]
    async fn test_generate_text_unknown_model() {
        let hf = client(spawn_upstream().await);

        let err = hf.generate_text(&request("gpt-9")).await.unwrap_err();
        assert!(matches!(err, AiError::UnknownModel(ref m) if m == "gpt-9"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let hf = client(spawn_upstream().await);

        let err = hf.generate_text(&request("blenderbot")).await.unwrap_err();
        assert!(matches!(err, AiError::Api { status: 503, .. }));
        assert!(!hf.test_connection().await);
    }

    #[tokio::test]
    async fn test_analysis_against_upstream() {
        let hf = client(spawn_upstream().await);

        let sentiment = hf.analyze_sentiment("love it").await.unwrap();
        assert_eq!(sentiment.label, SentimentLabel::Positive);
        assert_eq!(sentiment.model, SENTIMENT_MODEL);

        let odd = hf.analyze_sentiment("odd").await.unwrap();
        assert_eq!((odd.label, odd.score), (SentimentLabel::Neutral, 0.5));

        let moderation = hf.moderate_content("you are awful").await.unwrap();
        assert!(moderation.is_toxic);
        assert_eq!(moderation.toxicity_score, 0.9);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_http_error() {
        let hf = client("http://127.0.0.1:1".to_string());

        let err = hf.analyze_sentiment("hi").await.unwrap_err();
        assert!(matches!(err, AiError::Http(_)));
    }
}
// endregion: --- Tests
