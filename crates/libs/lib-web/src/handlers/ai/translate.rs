//! # Translation
//!
//! Single and batch translation through the [`AiClient`], plus the list of
//! languages offered to clients. Text already in the target language is
//! returned untouched without calling the model.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use futures_util::future::join_all;
use lib_ai::heuristics::detect_language;
use lib_ai::AiClient;
use lib_core::dto::{
    BatchTranslateRequest, BatchTranslateResponse, BatchTranslationItem, Language, LanguagesResponse,
    TranslateRequest, TranslateResponse,
};
use lib_core::model::ai::{TranslationRequest, TranslationResponse};
use lib_core::{AppError, Result};
use lib_utils::now_utc;
use tracing::{debug, instrument, warn};

use crate::handlers::{non_empty, JsonBody};

const SUPPORTED_LANGUAGES: [Language; 12] = [
    Language { code: "en", name: "English", native: "English" },
    Language { code: "es", name: "Spanish", native: "Español" },
    Language { code: "fr", name: "French", native: "Français" },
    Language { code: "de", name: "German", native: "Deutsch" },
    Language { code: "it", name: "Italian", native: "Italiano" },
    Language { code: "pt", name: "Portuguese", native: "Português" },
    Language { code: "ru", name: "Russian", native: "Русский" },
    Language { code: "zh", name: "Chinese", native: "中文" },
    Language { code: "ja", name: "Japanese", native: "日本語" },
    Language { code: "ko", name: "Korean", native: "한국어" },
    Language { code: "ar", name: "Arabic", native: "العربية" },
    Language { code: "hi", name: "Hindi", native: "हिन्दी" },
];

fn untranslated(text: String, source: String, target: String, confidence: f64, model: &str) -> TranslationResponse {
    TranslationResponse {
        translated_text: text.clone(),
        original_text: text,
        source_language: source,
        target_language: target,
        confidence,
        model: model.to_string(),
    }
}

/// `POST /api/ai/translate` - `{ text, targetLanguage, sourceLanguage?, userId }`
#[instrument(skip_all)]
pub async fn translate(
    State(ai): State<Arc<dyn AiClient>>,
    JsonBody(req): JsonBody<TranslateRequest>,
) -> Result<Json<TranslateResponse>> {
    let (Some(text), Some(target)) = (non_empty(req.text), non_empty(req.target_language)) else {
        return Err(AppError::InvalidInput("Text and targetLanguage are required".to_string()));
    };
    let user_id = non_empty(req.user_id).ok_or_else(|| AppError::InvalidInput("UserId is required".to_string()))?;

    let source = non_empty(req.source_language).unwrap_or_else(|| detect_language(&text).to_string());
    if source == target {
        return Ok(Json(TranslateResponse {
            success: true,
            translation: untranslated(text, source, target, 1.0, "no-translation-needed"),
            error: None,
        }));
    }

    let request = TranslationRequest {
        text,
        source_language: Some(source),
        target_language: target,
        user_id,
    };

    match ai.translate_text(&request).await {
        Ok(translation) => {
            debug!("[TRANSLATE] {} -> {}", translation.source_language, translation.target_language);
            Ok(Json(TranslateResponse {
                success: true,
                translation,
                error: None,
            }))
        }
        Err(e) => {
            warn!("[TRANSLATE] falling back: {}", e);
            let TranslationRequest {
                text,
                source_language,
                target_language,
                ..
            } = request;

            Ok(Json(TranslateResponse {
                success: false,
                translation: untranslated(text, source_language.unwrap_or_default(), target_language, 0.0, "fallback"),
                error: Some("Translation service unavailable".to_string()),
            }))
        }
    }
}

async fn translate_item(ai: &dyn AiClient, index: usize, request: TranslationRequest) -> BatchTranslationItem {
    match ai.translate_text(&request).await {
        Ok(translation) => BatchTranslationItem {
            index,
            translation,
            error: None,
        },
        Err(e) => {
            warn!("[TRANSLATE] batch item {} failed: {}", index, e);
            let source = request.source_language.unwrap_or_else(|| "unknown".to_string());
            BatchTranslationItem {
                index,
                translation: untranslated(request.text, source, request.target_language, 0.0, "fallback"),
                error: Some("Translation failed".to_string()),
            }
        }
    }
}

/// `PUT /api/ai/translate` - up to five texts into one target language.
#[instrument(skip_all)]
pub async fn batch_translate(
    State(ai): State<Arc<dyn AiClient>>,
    JsonBody(req): JsonBody<BatchTranslateRequest>,
) -> Result<Json<BatchTranslateResponse>> {
    let texts = req
        .texts
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Texts array is required and cannot be empty".to_string()))?;
    if texts.len() > BatchTranslateRequest::MAX_TEXTS {
        return Err(AppError::InvalidInput("Maximum 5 texts can be translated at once".to_string()));
    }
    let (Some(target), Some(user_id)) = (non_empty(req.target_language), non_empty(req.user_id)) else {
        return Err(AppError::InvalidInput("TargetLanguage and userId are required".to_string()));
    };
    let source = non_empty(req.source_language);

    let requests = texts.into_iter().enumerate().map(|(index, text)| {
        let request = TranslationRequest {
            text,
            source_language: source.clone(),
            target_language: target.clone(),
            user_id: user_id.clone(),
        };
        translate_item(ai.as_ref(), index, request)
    });
    let translations = join_all(requests).await;

    Ok(Json(BatchTranslateResponse {
        success: true,
        translations,
        timestamp: now_utc(),
    }))
}

/// `GET /api/ai/translate`
pub async fn languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        success: true,
        total: SUPPORTED_LANGUAGES.len(),
        languages: SUPPORTED_LANGUAGES.to_vec(),
    })
}

// endregion: --- Tests
