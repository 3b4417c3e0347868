//! # Prompt Building
//!
//! Turns a chat message plus recent room history into a generation request,
//! and cleans up what comes back.

use std::sync::LazyLock;

use lib_core::model::ai::AiRequest;
use lib_core::model::chat::{Message, Room, RoomType, User};
use regex::Regex;

use crate::error::AiError;
use crate::models::DEFAULT_CHAT_MODEL;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful, friendly AI assistant in a chat application. \
Provide concise, engaging responses. Be conversational and helpful.";

pub const CODE_SYSTEM_PROMPT: &str = "You are a programming assistant specializing in helping with code, \
debugging, explaining concepts, and providing technical guidance. \
Provide clear, accurate, and practical programming advice.";

/// Catalog id that marks a room as a code-help room.
pub const CODE_MODEL: &str = "codet5";

const PROMPT_CONTEXT_MESSAGES: usize = 5;
const REQUEST_CONTEXT_MESSAGES: usize = 3;
const CONTEXT_ENTRY_TOKENS: u32 = 100;
const MAX_RESPONSE_CHARS: usize = 1000;
const CHARS_PER_TOKEN: usize = 4;

static ASSISTANT_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*Assistant:\s*").expect("valid assistant prefix regex"));

static AI_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*AI:\s*").expect("valid ai prefix regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

fn last<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

/// Build a transcript-style prompt.
///
/// ```text
/// <system prompt>
///
/// Recent conversation:
/// User: ...
/// Assistant: ...
///
/// User: <message>
/// Assistant:
/// ```
///
/// Only the last five context messages are included.
pub fn create_chat_prompt(user_message: &str, context: &[Message], personality: Option<&str>) -> String {
    let mut prompt = format!("{}\n\n", personality.unwrap_or(DEFAULT_SYSTEM_PROMPT));

    let recent = last(context, PROMPT_CONTEXT_MESSAGES);
    if !recent.is_empty() {
        prompt.push_str("Recent conversation:\n");
        for msg in recent {
            let role = if msg.is_ai() { "Assistant" } else { "User" };
            prompt.push_str(&format!("{}: {}\n", role, msg.content));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User: {}\nAssistant:", user_message));
    prompt
}

pub fn create_code_assistant_prompt(user_message: &str, context: &[Message]) -> String {
    create_chat_prompt(user_message, context, Some(CODE_SYSTEM_PROMPT))
}

pub fn is_code_room(room: &Room) -> bool {
    room.ai_model.as_deref() == Some(CODE_MODEL)
}

/// Build the generation request for a message posted in `room`.
///
/// The model is the code model for code rooms, otherwise the user's preferred
/// model (falling back to [`DEFAULT_CHAT_MODEL`] in assistant rooms and
/// `gpt2-large` elsewhere). Callers override it with an explicit or room model.
/// Each of the three context entries is cut to about 100 tokens.
pub fn generate_contextual_prompt(message: &str, user: &User, room: &Room, previous: &[Message]) -> AiRequest {
    let preferred = Some(user.ai_preferences.preferred_model.as_str()).filter(|m| !m.is_empty());

    let (model, prompt) = if is_code_room(room) {
        (CODE_MODEL, create_code_assistant_prompt(message, previous))
    } else if room.room_type == RoomType::AiAssistant {
        (preferred.unwrap_or(DEFAULT_CHAT_MODEL), create_chat_prompt(message, previous, None))
    } else {
        (preferred.unwrap_or("gpt2-large"), create_chat_prompt(message, previous, None))
    };

    AiRequest {
        model: model.to_string(),
        prompt,
        max_tokens: Some(500),
        temperature: Some(0.7),
        user_id: user.id.clone(),
        room_id: room.id.clone(),
        context: last(previous, REQUEST_CONTEXT_MESSAGES)
            .iter()
            .map(|m| truncate_to_token_limit(&m.content, CONTEXT_ENTRY_TOKENS))
            .collect(),
    }
}

/// Strip a leading `Assistant:` / `AI:` label, cap at 1000 characters and
/// collapse whitespace runs.
pub fn sanitize_ai_response(response: &str) -> String {
    let text = ASSISTANT_PREFIX_RE.replace(response.trim(), "");
    let text = AI_PREFIX_RE.replace(&text, "");
    let capped: String = text.chars().take(MAX_RESPONSE_CHARS).collect();

    WHITESPACE_RE.replace_all(&capped, " ").into_owned()
}

/// User-facing explanation of an AI failure.
pub fn format_ai_error(err: &AiError) -> String {
    let detail = err.to_string().to_lowercase();

    if err.is_rate_limited() {
        return "AI service is busy. Please try again in a moment.".to_string();
    }

    if matches!(err, AiError::Http(_)) {
        return "Network connection issue. Please check your internet connection.".to_string();
    }

    let auth_failure = matches!(err, AiError::Api { status: 401 | 403, .. });
    if auth_failure || detail.contains("api key") || detail.contains("unauthorized") {
        return "AI service authentication issue. Please contact support.".to_string();
    }

    if matches!(err, AiError::UnknownModel(_)) || detail.contains("model") || detail.contains("not found") {
        return "The selected AI model is not available. Please try a different model.".to_string();
    }

    "AI service is temporarily unavailable. Please try again later.".to_string()
}

/// Rough token count at four characters per token.
pub fn estimate_tokens(text: &str) -> u32 {
    text.chars().count().div_ceil(CHARS_PER_TOKEN) as u32
}

/// Cut `text` to roughly `max_tokens`, marking the cut with `...`.
pub fn truncate_to_token_limit(text: &str, max_tokens: u32) -> String {
    if estimate_tokens(text) <= max_tokens {
        return text.to_string();
    }

    let keep = (max_tokens as usize * CHARS_PER_TOKEN).saturating_sub(3);
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str("...");
    truncated
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lib_core::model::chat::{AiPreferences, MessageType, UserStatus};

    fn user(preferred: &str) -> User {
        User {
            id: "user1".to_string(),
            username: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            avatar: None,
            status: UserStatus::Online,
            last_seen: Utc::now(),
            ai_preferences: AiPreferences {
                preferred_model: preferred.to_string(),
                ..AiPreferences::default()
            },
        }
    }

    fn room(room_type: RoomType, ai_model: Option<&str>) -> Room {
        Room {
            id: "r1".to_string(),
            name: "Room".to_string(),
            description: String::new(),
            room_type,
            thumbnail: None,
            members: vec!["user1".to_string()],
            ai_model: ai_model.map(str::to_string),
            created_at: Utc::now(),
            last_activity: Utc::now(),
        }
    }

    fn history(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                let mut msg = Message::text("r1", "user1", "John Doe", format!("line {}", i));
                if i % 2 == 1 {
                    msg.message_type = MessageType::AiResponse;
                }
                msg
            })
            .collect()
    }

    #[test]
    fn test_chat_prompt_without_context() {
        let prompt = create_chat_prompt("Hi", &[], None);
        assert_eq!(prompt, format!("{}\n\nUser: Hi\nAssistant:", DEFAULT_SYSTEM_PROMPT));
    }

    #[test]
    fn test_chat_prompt_keeps_last_five() {
        let prompt = create_chat_prompt("Next?", &history(7), None);

        assert!(!prompt.contains("line 1\n"));
        assert!(prompt.contains("User: line 2\n"));
        assert!(prompt.contains("Assistant: line 3\n"));
        assert!(prompt.ends_with("User: Next?\nAssistant:"));
    }

    #[test]
    fn test_contextual_prompt_model_choice() {
        let req = generate_contextual_prompt("fix this", &user("blenderbot"), &room(RoomType::AiAssistant, Some("codet5")), &[]);
        assert_eq!(req.model, "codet5");
        assert!(req.prompt.starts_with(CODE_SYSTEM_PROMPT));

        let req = generate_contextual_prompt("hi", &user(""), &room(RoomType::AiAssistant, None), &[]);
        assert_eq!(req.model, DEFAULT_CHAT_MODEL);

        let req = generate_contextual_prompt("hi", &user(""), &room(RoomType::General, None), &history(4));
        assert_eq!(req.model, "gpt2-large");
        assert_eq!(req.max_tokens, Some(500));
        assert_eq!(req.context, vec!["line 1", "line 2", "line 3"]);
    }

    #[test]
    fn test_sanitize_ai_response() {
        assert_eq!(sanitize_ai_response("  Assistant:   Hello\n\nthere  "), "Hello there");
        assert_eq!(sanitize_ai_response("ai: sure"), "sure");
        assert_eq!(sanitize_ai_response(&"a".repeat(1500)).len(), 1000);
    }

    #[test]
    fn test_format_ai_error() {
        let busy = AiError::Api { status: 429, body: "slow down".into() };
        assert!(format_ai_error(&busy).contains("busy"));

        let auth = AiError::Api { status: 401, body: "bad token".into() };
        assert!(format_ai_error(&auth).contains("authentication"));

        let loading = AiError::Api { status: 503, body: "Model gpt2 is currently loading".into() };
        assert!(format_ai_error(&loading).contains("model is not available"));

        let unknown = AiError::UnknownModel("gpt-9".into());
        assert!(format_ai_error(&unknown).contains("model is not available"));

        let other = AiError::Api { status: 500, body: "boom".into() };
        assert!(format_ai_error(&other).contains("temporarily unavailable"));
    }

    #[test]
    fn test_contextual_prompt_caps_context_entries() {
        let mut previous = history(2);
        previous[1].content = "y".repeat(1000);

        let req = generate_contextual_prompt("hi", &user(""), &room(RoomType::General, None), &previous);

        assert_eq!(req.context[0], "line 0");
        assert_eq!(req.context[1].chars().count(), 400);
        assert!(req.context[1].ends_with("..."));
    }

    #[test]
    fn test_token_helpers() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcde"), 2);

        assert_eq!(truncate_to_token_limit("short", 10), "short");
        let cut = truncate_to_token_limit(&"x".repeat(100), 5);
        assert_eq!(cut.len(), 20);
        assert!(cut.ends_with("..."));
    }
}
// endregion: --- Tests
