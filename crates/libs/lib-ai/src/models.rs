//! # Model Catalog
//!
//! Hosted models the server knows about, addressed by a short catalog id
//! (`blenderbot`) that maps to the provider's model id
//! (`facebook/blenderbot-400M-distill`).

use serde::Serialize;

/// Catalog id used when neither request, room nor user names a model.
pub const DEFAULT_CHAT_MODEL: &str = "blenderbot";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    TextGeneration,
    Conversational,
    Translation,
    Sentiment,
    Moderation,
    Code,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Chat,
    TextGeneration,
    Translation,
    SentimentAnalysis,
    ContentModeration,
    CodeAssistance,
    QuestionAnswering,
    Summarization,
}

impl Capability {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "chat" => Capability::Chat,
            "text-generation" => Capability::TextGeneration,
            "translation" => Capability::Translation,
            "sentiment-analysis" => Capability::SentimentAnalysis,
            "content-moderation" => Capability::ContentModeration,
            "code-assistance" => Capability::CodeAssistance,
            "question-answering" => Capability::QuestionAnswering,
            "summarization" => Capability::Summarization,
            _ => return None,
        })
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub provider: &'static str,
    pub model_id: &'static str,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub capabilities: &'static [Capability],
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    pub is_available: bool,
}

#[allow(clippy::too_many_arguments)]
const fn hf(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    model_id: &'static str,
    model_type: ModelType,
    capabilities: &'static [Capability],
    max_tokens: u32,
    temperature: Option<f64>,
) -> AiModel {
    AiModel {
        id,
        name,
        description,
        provider: "huggingface",
        model_id,
        model_type,
        capabilities,
        max_tokens,
        temperature,
        is_available: true,
    }
}

pub static CHAT_MODELS: &[AiModel] = &[
    hf("gpt2-large", "GPT-2 Large", "Creative text generation and conversation", "gpt2-large",
        ModelType::TextGeneration, &[Capability::Chat, Capability::TextGeneration], 1024, Some(0.7)),
    hf("blenderbot", "BlenderBot", "Conversational AI with personality", "facebook/blenderbot-400M-distill",
        ModelType::Conversational, &[Capability::Chat, Capability::QuestionAnswering], 512, Some(0.8)),
    hf("dialogpt", "DialoGPT", "Microsoft conversational model", "microsoft/DialoGPT-large",
        ModelType::Conversational, &[Capability::Chat, Capability::TextGeneration], 1000, Some(0.7)),
    hf("codet5", "CodeT5", "Code generation and explanation", "Salesforce/codet5-large",
        ModelType::Code, &[Capability::CodeAssistance, Capability::TextGeneration], 512, Some(0.2)),
    hf("flan-t5", "FLAN-T5", "Instruction-following AI assistant", "google/flan-t5-large",
        ModelType::TextGeneration, &[Capability::QuestionAnswering, Capability::Summarization, Capability::Chat], 512, Some(0.3)),
];

pub static TRANSLATION_MODELS: &[AiModel] = &[
    hf("helsinki-opus", "OPUS-MT", "Multi-language translation", "Helsinki-NLP/opus-mt-en-ROMANCE",
        ModelType::Translation, &[Capability::Translation], 512, None),
];

pub static ANALYSIS_MODELS: &[AiModel] = &[
    hf("sentiment-roberta", "RoBERTa Sentiment", "Sentiment analysis and emotion detection",
        "cardiffnlp/twitter-roberta-base-sentiment-latest",
        ModelType::Sentiment, &[Capability::SentimentAnalysis], 512, None),
    hf("toxicity-detector", "Toxicity Detector", "Content moderation and safety", "martin-ha/toxic-comment-model",
        ModelType::Moderation, &[Capability::ContentModeration], 512, None),
];

/// Every catalog entry: chat, then translation, then analysis models.
pub fn all_models() -> impl Iterator<Item = &'static AiModel> {
    CHAT_MODELS
        .iter()
        .chain(TRANSLATION_MODELS)
        .chain(ANALYSIS_MODELS)
}

pub fn get_model_by_id(id: &str) -> Option<&'static AiModel> {
    all_models().find(|m| m.id == id)
}

pub fn models_by_capability(capability: Capability) -> Vec<&'static AiModel> {
    all_models()
        .filter(|m| m.capabilities.contains(&capability))
        .collect()
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_id() {
        let model = get_model_by_id("blenderbot").unwrap();
        assert_eq!(model.model_id, "facebook/blenderbot-400M-distill");
        assert_eq!(model.temperature, Some(0.8));
        assert!(get_model_by_id("gpt-9").is_none());
        assert!(get_model_by_id(DEFAULT_CHAT_MODEL).is_some());
    }

    #[test]
    fn test_lookup_by_capability() {
        let chat: Vec<_> = models_by_capability(Capability::Chat).iter().map(|m| m.id).collect();
        assert_eq!(chat, vec!["gpt2-large", "blenderbot", "dialogpt", "flan-t5"]);

        let moderation = models_by_capability(Capability::ContentModeration);
        assert_eq!(moderation.len(), 1);
        assert_eq!(moderation[0].id, "toxicity-detector");
    }

    #[test]
    fn test_catalog_wire_format() {
        let value = serde_json::to_value(get_model_by_id("codet5").unwrap()).unwrap();
        assert_eq!(value["type"], "code");
        assert_eq!(value["modelId"], "Salesforce/codet5-large");
        assert_eq!(value["capabilities"][0], "code-assistance");
    }
}
// endregion: --- Tests
