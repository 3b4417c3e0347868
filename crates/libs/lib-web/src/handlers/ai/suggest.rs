//! # Suggestions
//!
//! Local, model-free helpers for the composer: phrase suggestions while
//! typing, conversation starters for an empty input, and quick replies to the
//! last message in a room. All of them honour the user's
//! `enableSuggestions` preference.

use axum::extract::State;
use axum::Json;
use lib_ai::heuristics::{
    autocomplete_suggestions, conversation_starters, extract_message_suggestions, smart_replies, MIN_SUGGESTION_INPUT,
};
use lib_core::dto::{ReplySource, SmartReplyQuery, SmartReplyResponse, SuggestRequest, SuggestResponse};
use lib_core::model::chat::Room;
use lib_core::{AppError, ChatStore, Result};
use lib_utils::now_utc;
use tracing::{debug, instrument};

use super::CONTEXT_MESSAGES;
use crate::handlers::{find_user, non_empty, JsonBody, QueryParams};

const BASED_ON_PREVIEW_CHARS: usize = 50;

/// The room, if it exists and `user_id` belongs to it.
fn accessible_room(store: &ChatStore, room_id: &str, user_id: &str) -> Option<Room> {
    store.get_room(room_id).filter(|room| room.is_member(user_id))
}

fn dedupe(suggestions: Vec<String>, limit: usize) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(limit);
    for suggestion in suggestions {
        if unique.len() == limit {
            break;
        }
        if !unique.contains(&suggestion) {
            unique.push(suggestion);
        }
    }
    unique
}

/// `POST /api/ai/suggest` - `{ input?, userId, roomId, context? }`
#[instrument(skip_all)]
pub async fn suggest(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<SuggestRequest>,
) -> Result<Json<SuggestResponse>> {
    let (Some(user_id), Some(room_id)) = (non_empty(req.user_id), non_empty(req.room_id)) else {
        return Err(AppError::InvalidInput("UserId and roomId are required".to_string()));
    };

    let user = find_user(&store, &user_id)?;
    let room = accessible_room(&store, &room_id, &user.id)
        .ok_or_else(|| AppError::Forbidden("Room access denied".to_string()))?;

    if !user.ai_preferences.enable_suggestions {
        return Ok(Json(SuggestResponse {
            success: true,
            suggestions: Vec::new(),
            input: None,
            message: Some("Suggestions disabled for user".to_string()),
            timestamp: now_utc(),
        }));
    }

    let input = req.input.unwrap_or_default();
    let context: Vec<String> = match req.context {
        Some(context) => context,
        None => {
            let messages = store.get_messages(&room.id);
            let skip = messages.len().saturating_sub(CONTEXT_MESSAGES);
            messages.into_iter().skip(skip).map(|m| m.content).collect()
        }
    };

    let suggestions = if input.chars().count() >= MIN_SUGGESTION_INPUT {
        let mut suggestions = extract_message_suggestions(&context, &input);
        suggestions.extend(autocomplete_suggestions(&input));
        suggestions
    } else {
        conversation_starters(&room, !context.is_empty())
    };

    let suggestions = dedupe(suggestions, SuggestRequest::MAX_SUGGESTIONS);
    debug!("[SUGGEST] {} suggestions for {} in {}", suggestions.len(), user.id, room.id);

    Ok(Json(SuggestResponse {
        success: true,
        suggestions,
        input: Some(input),
        message: None,
        timestamp: now_utc(),
    }))
}

/// `GET /api/ai/suggest?roomId=..&userId=..` - replies to the room's last
/// message, unless the caller wrote it.
#[instrument(skip_all)]
pub async fn get_smart_replies(
    State(store): State<ChatStore>,
    QueryParams(query): QueryParams<SmartReplyQuery>,
) -> Result<Json<SmartReplyResponse>> {
    let (Some(room_id), Some(user_id)) = (non_empty(query.room_id), non_empty(query.user_id)) else {
        return Err(AppError::InvalidInput("RoomId and userId are required".to_string()));
    };

    let denied = || AppError::Forbidden("Access denied".to_string());
    let user = store.get_user(&user_id).ok_or_else(denied)?;
    accessible_room(&store, &room_id, &user.id).ok_or_else(denied)?;

    let empty = |message: Option<&str>| SmartReplyResponse {
        success: true,
        smart_replies: Vec::new(),
        based_on: None,
        message: message.map(str::to_string),
    };

    if !user.ai_preferences.enable_suggestions {
        return Ok(Json(empty(Some("Smart replies disabled"))));
    }

    let Some(last) = store.get_messages(&room_id).pop().filter(|m| m.user_id != user.id) else {
        return Ok(Json(empty(None)));
    };

    let preview: String = last.content.chars().take(BASED_ON_PREVIEW_CHARS).collect();
    Ok(Json(SmartReplyResponse {
        success: true,
        smart_replies: smart_replies(&last.content),
        based_on: Some(ReplySource {
            message_id: last.id,
            content: format!("{}...", preview),
            from: last.username,
        }),
        message: None,
    }))
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::dedupe;
    use crate::handlers::test_support::{call, test_app, ScriptedAi};
    use axum::http::StatusCode;
    use lib_core::model::chat::Message;
    use serde_json::json;

    #[test]
    fn test_dedupe_keeps_first_occurrence() {
        let items = ["a", "b", "a", "c", "b", "d"].map(String::from).to_vec();

        assert_eq!(dedupe(items.clone(), 3), vec!["a", "b", "c"]);
        assert_eq!(dedupe(items, 10), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_suggest_with_input() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (status, body) = call(
            &app,
            "POST",
            "/api/ai/suggest",
            Some(json!({ "input": "can you", "userId": "user1", "roomId": "general" })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        let suggestions = body["suggestions"].as_array().unwrap();
        assert!(!suggestions.is_empty());
        assert!(suggestions.len() <= 5);
        assert!(suggestions.contains(&json!("Can you help me with this?")));
        assert_eq!(body["input"], "can you");
    }

    #[tokio::test]
    async fn test_suggest_starters_for_code_room() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (_, body) = call(&app, "POST", "/api/ai/suggest", Some(json!({ "userId": "user1", "roomId": "code-help" }))).await;

        // Assert
        assert_eq!(body["suggestions"][0], "I'm having trouble with this code:");
        assert_eq!(body["suggestions"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_suggest_access_and_preferences() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (unknown, _) = call(&app, "POST", "/api/ai/suggest", Some(json!({ "userId": "ghost", "roomId": "general" }))).await;
        let (outsider, _) = call(&app, "POST", "/api/ai/suggest", Some(json!({ "userId": "user2", "roomId": "code-help" }))).await;
        let (status, disabled) = call(&app, "POST", "/api/ai/suggest", Some(json!({ "input": "how", "userId": "user2", "roomId": "general" }))).await;

        // Assert
        assert_eq!(unknown, StatusCode::NOT_FOUND);
        assert_eq!(outsider, StatusCode::FORBIDDEN);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(disabled["suggestions"], json!([]));
        assert_eq!(disabled["message"], "Suggestions disabled for user");
    }

    #[tokio::test]
    async fn test_smart_replies() {
        // Arrange
        let (app, store) = test_app(ScriptedAi::healthy());

        // Act
        let (_, replies) = call(&app, "GET", "/api/ai/suggest?roomId=general&userId=user3", None).await;
        let (_, disabled) = call(&app, "GET", "/api/ai/suggest?roomId=general&userId=user2", None).await;
        let (denied, _) = call(&app, "GET", "/api/ai/suggest?roomId=code-help&userId=user3", None).await;

        // Assert
        assert_eq!(replies["smartReplies"], json!(["That's fantastic!", "I'm glad to hear that!", "Awesome news!"]));
        assert_eq!(replies["basedOn"]["messageId"], "msg2");
        assert_eq!(replies["basedOn"]["from"], "Jane Smith");
        assert_eq!(replies["basedOn"]["content"], "Great! Just working on some exciting projects. The...");
        assert_eq!(disabled["smartReplies"], json!([]));
        assert_eq!(disabled["message"], "Smart replies disabled");
        assert_eq!(denied, StatusCode::FORBIDDEN);

        // Act
        store
            .add_message(Message::text("general", "user3", "Mike Johnson", "Anyone around?"))
            .unwrap();
        let (_, own) = call(&app, "GET", "/api/ai/suggest?roomId=general&userId=user3", None).await;

        // Assert
        assert_eq!(own["smartReplies"], json!([]));
        assert!(own.get("basedOn").is_none());
        assert!(own.get("message").is_none());
    }
}
// endregion: --- Tests
