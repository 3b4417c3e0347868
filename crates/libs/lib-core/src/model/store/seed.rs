//! Demo data loaded by [`ChatStore::with_sample_data`](super::ChatStore::with_sample_data).

use chrono::{Duration, TimeZone, Utc};

use super::State;
use crate::model::chat::{
    AiPreferences, Message, MessageAnalysis, MessageType, Room, RoomType, Sentiment, User,
    UserStatus,
};

fn avatar(name: &str) -> Option<String> {
    Some(format!("/avatars/{}.png", name))
}

fn user(id: &str, username: &str, email: &str, status: UserStatus, idle_mins: i64, prefs: AiPreferences) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        avatar: avatar(id),
        status,
        last_seen: Utc::now() - Duration::minutes(idle_mins),
        ai_preferences: prefs,
    }
}

fn prefs(model: &str, auto_translate: bool, show_sentiment: bool, suggestions: bool) -> AiPreferences {
    AiPreferences {
        preferred_model: model.to_string(),
        auto_translate,
        show_sentiment,
        enable_suggestions: suggestions,
    }
}

pub(super) fn populate(state: &mut State) {
    let now = Utc::now();
    let created = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);

    let users = [
        user("user1", "John Doe", "john@example.com", UserStatus::Online, 0, prefs("blenderbot", false, true, true)),
        user("user2", "Jane Smith", "jane@example.com", UserStatus::Online, 5, prefs("gpt2-large", true, true, false)),
        user("user3", "Mike Johnson", "mike@example.com", UserStatus::Away, 10, prefs("codet5", false, false, true)),
        user("ai-bot", "AI Assistant", "ai@chatapp.com", UserStatus::Online, 0, prefs("blenderbot", false, false, false)),
    ];

    let room = |id: &str, name: &str, description: &str, room_type: RoomType, members: &[&str], ai_model: Option<&str>| Room {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        room_type,
        thumbnail: Some(format!("/rooms/{}.png", id)),
        members: members.iter().map(|m| m.to_string()).collect(),
        ai_model: ai_model.map(str::to_string),
        created_at: created,
        last_activity: now,
    };

    let rooms = vec![
        room("general", "General Chat", "General discussion for everyone", RoomType::General, &["user1", "user2", "user3"], None),
        room("ai-assistant", "AI Assistant", "Chat with AI-powered assistants", RoomType::AiAssistant, &["user1", "ai-bot"], Some("blenderbot")),
        room("code-help", "Code Help", "Programming assistance and code review", RoomType::AiAssistant, &["user1", "code-ai"], Some("codet5")),
    ];

    let message = |id: &str, room_id: &str, user_id: &str, username: &str, mins_ago: i64, message_type: MessageType, content: &str| Message {
        id: id.to_string(),
        content: content.to_string(),
        user_id: user_id.to_string(),
        username: username.to_string(),
        user_avatar: avatar(user_id),
        room_id: room_id.to_string(),
        timestamp: now - Duration::minutes(mins_ago),
        message_type,
        ai_analysis: None,
        reply_to: None,
        edited: false,
        edited_at: None,
    };

    let mut msg2 = message(
        "msg2", "general", "user2", "Jane Smith", 55, MessageType::Text,
        "Great! Just working on some exciting projects. The AI integration here looks amazing!",
    );
    msg2.ai_analysis = Some(MessageAnalysis {
        sentiment: Sentiment::Positive,
        confidence: 0.92,
        toxicity: 0.02,
        topics: vec!["work".to_string(), "projects".to_string(), "AI".to_string()],
        language: "en".to_string(),
        model_used: "sentiment-roberta".to_string(),
        processed_at: msg2.timestamp,
    });

    state.messages.insert(
        "general".to_string(),
        vec![
            message("msg1", "general", "user1", "John Doe", 60, MessageType::Text,
                "Welcome to the chat! How is everyone doing today?"),
            msg2,
        ],
    );
    state.messages.insert(
        "ai-assistant".to_string(),
        vec![message("msg3", "ai-assistant", "ai-bot", "AI Assistant", 30, MessageType::AiResponse,
            "Hello! I'm your AI assistant. I can help with various tasks, answer questions, and have conversations. What would you like to talk about?")],
    );
    state.messages.insert(
        "code-help".to_string(),
        vec![message("msg4", "code-help", "code-ai", "Code Assistant", 20, MessageType::AiResponse,
            "I can help you with programming questions, code review, debugging, and explaining complex concepts. Just share your code or ask your question!")],
    );

    state.rooms = rooms;
    state.users = users.into_iter().map(|u| (u.id.clone(), u)).collect();
    state.online_users = vec!["user1".to_string(), "user2".to_string(), "ai-bot".to_string()];
}
