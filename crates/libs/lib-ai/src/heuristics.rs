//! # Keyword Heuristics
//!
//! Cheap, local stand-ins for NLP: topic tags, language guessing and canned
//! suggestion lists. None of these call the inference service.

use lib_core::model::chat::{Room, RoomType};

use crate::prompt::is_code_room;

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("technology", &["tech", "computer", "software", "app", "website", "code", "programming"]),
    ("work", &["work", "job", "career", "office", "meeting", "project", "business"]),
    ("personal", &["family", "friend", "personal", "life", "home", "health"]),
    ("education", &["school", "learn", "study", "education", "student", "teacher"]),
    ("entertainment", &["movie", "music", "game", "fun", "entertainment", "sport"]),
    ("food", &["food", "eat", "restaurant", "cook", "recipe", "meal"]),
    ("travel", &["travel", "trip", "vacation", "flight", "hotel", "visit"]),
];

const STOP_WORDS: &[(&str, &[&str])] = &[
    ("en", &["the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by"]),
    ("es", &["el", "la", "y", "o", "pero", "en", "con", "para", "de", "por", "que"]),
    ("fr", &["le", "la", "et", "ou", "mais", "dans", "sur", "pour", "de", "avec", "que"]),
    ("de", &["der", "die", "das", "und", "oder", "aber", "in", "auf", "für", "von", "mit"]),
];

const COMMON_PHRASES: &[&str] = &[
    "That's really interesting!",
    "Can you tell me more about that?",
    "I understand what you mean.",
    "That makes perfect sense.",
    "I'd like to learn more about this.",
    "Thanks for explaining that!",
    "Could you provide an example?",
    "What do you think about this?",
    "That's a great point.",
    "I appreciate your help!",
];

const COMPLETIONS: &[(&str, &[&str])] = &[
    ("how", &["How are you doing?", "How does this work?", "How can I help?", "How do you think we should proceed?"]),
    ("what", &["What do you think about this?", "What are your thoughts?", "What should we do next?", "What time works best?"]),
    ("i think", &["I think that makes sense.", "I think we should consider this.", "I think you're right about that."]),
    ("thank", &["Thank you so much!", "Thanks for your help!", "Thank you for explaining that.", "Thanks for the information!"]),
    ("can you", &["Can you help me with this?", "Can you explain that again?", "Can you check if this is correct?", "Can you provide more details?"]),
];

/// Suggestions are only offered once this many characters were typed.
pub const MIN_SUGGESTION_INPUT: usize = 2;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Tag text with every topic whose keywords occur in it.
///
/// Untagged text becomes `question` if it contains a `?`, else `general`.
pub fn extract_topics(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut topics: Vec<String> = TOPIC_KEYWORDS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(topic, _)| topic.to_string())
        .collect();

    if topics.is_empty() {
        topics.push(if lower.contains('?') { "question" } else { "general" }.to_string());
    }
    topics
}

/// Guess the language by counting known stop words.
///
/// Returns `en`, `es`, `fr` or `de`; ties go to the earlier language and text
/// without any stop word is `en`.
pub fn detect_language(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower.split_whitespace().collect();

    let mut best = ("en", 0usize);
    for &(lang, stop_words) in STOP_WORDS {
        let score = stop_words.iter().filter(|w| words.contains(*w)).count();
        if score > best.1 {
            best = (lang, score);
        }
    }
    best.0
}

/// Whether a message should be auto-translated for a reader.
pub fn should_translate(message: &str, user_language: &str, auto_translate: bool) -> bool {
    auto_translate && detect_language(message) != user_language
}

/// Phrase suggestions matching the current input, plus nudges from the last
/// three context messages. At most three.
pub fn extract_message_suggestions(context: &[String], input: &str) -> Vec<String> {
    if input.chars().count() < MIN_SUGGESTION_INPUT {
        return Vec::new();
    }

    let lower_input = input.to_lowercase();
    let mut suggestions: Vec<String> = COMMON_PHRASES
        .iter()
        .filter(|p| p.to_lowercase().contains(&lower_input))
        .map(|p| p.to_string())
        .collect();

    let recent = &context[context.len().saturating_sub(3)..];
    for content in recent {
        let content = content.to_lowercase();
        if content.contains("question") && !lower_input.contains("answer") {
            suggestions.push("Let me answer that for you.".to_string());
        }
        if content.contains("help") && !lower_input.contains("thank") {
            suggestions.push("Thank you for your help!".to_string());
        }
    }

    suggestions.truncate(3);
    suggestions
}

/// Openers offered when the input box is (nearly) empty.
pub fn conversation_starters(room: &Room, has_recent_messages: bool) -> Vec<String> {
    if is_code_room(room) {
        return owned(&[
            "I'm having trouble with this code:",
            "Can you review this function?",
            "What's the best way to implement...",
            "I'm getting an error with...",
            "How do I optimize this algorithm?",
        ]);
    }

    if room.room_type == RoomType::AiAssistant {
        return owned(&[
            "Can you help me with something?",
            "I have a question about...",
            "What do you think about...",
            "Can you explain how...",
            "I'd like to learn more about...",
        ]);
    }

    if has_recent_messages {
        owned(&[
            "That's interesting!",
            "I agree with that.",
            "What do you all think?",
            "Has anyone tried...",
            "Speaking of which...",
        ])
    } else {
        owned(&[
            "Hello everyone!",
            "How's everyone doing?",
            "Good morning!",
            "What's new today?",
            "Hope everyone is having a great day!",
        ])
    }
}

/// Completions of common openers (`how`, `thank`, `can you`, ...). At most three.
pub fn autocomplete_suggestions(input: &str) -> Vec<String> {
    let lower_input = input.to_lowercase();

    COMPLETIONS
        .iter()
        .filter(|(prefix, _)| lower_input.starts_with(prefix))
        .flat_map(|(_, phrases)| phrases.iter())
        .filter(|phrase| phrase.to_lowercase().starts_with(&lower_input))
        .take(3)
        .map(|phrase| phrase.to_string())
        .collect()
}

/// Quick replies to someone else's message. At most three.
pub fn smart_replies(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let mut replies: Vec<&str> = Vec::new();

    if lower.contains('?') {
        replies.extend(["Let me think about that...", "Good question! I think...", "That's something I've wondered about too."]);
    }
    if has_any(&["hello", "hi ", "hey"]) {
        replies.extend(["Hello!", "Hi there!", "Hey! How's it going?"]);
    }
    if has_any(&["thank", "appreciate"]) {
        replies.extend(["You're welcome!", "Happy to help!", "No problem at all!"]);
    }
    if has_any(&["problem", "help", "issue"]) {
        replies.extend(["I can help with that.", "What specifically are you struggling with?", "Let's work through this together."]);
    }
    if has_any(&["great", "awesome", "excellent"]) {
        replies.extend(["That's fantastic!", "I'm glad to hear that!", "Awesome news!"]);
    }
    if replies.is_empty() {
        replies.extend(["That's interesting!", "I see what you mean.", "Tell me more about that."]);
    }

    replies.truncate(3);
    owned(&replies)
}

// endregion: --- Tests
