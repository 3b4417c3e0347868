//! # Message Handlers
//!
//! Room history, posting, author-only edit and soft delete, and search.
//!
//! Posted and edited content is validated with
//! [`validate_message`](lib_utils::validate_message) and then passed through
//! [`sanitize_message`](lib_utils::sanitize_message) before it is stored.

use axum::extract::State;
use axum::Json;
use lib_core::dto::{
    DeleteMessageQuery, EditMessageRequest, MessagePage, MessageResponse, MessagesQuery,
    SearchQuery, SearchResponse, SendMessageRequest, SuccessResponse,
};
use lib_core::model::chat::{Message, MessagePatch, MessageType};
use lib_core::{AppError, ChatStore, Result};
use lib_utils::{sanitize_message, validate_message};
use tracing::{debug, info, instrument, warn};

use super::{ensure_member, find_room, find_user, non_empty, JsonBody, QueryParams};

fn own_message(store: &ChatStore, room_id: &str, message_id: &str, user_id: &str) -> Result<Message> {
    let message = store
        .get_message(room_id, message_id)
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    if message.user_id != user_id {
        warn!("[MESSAGES] {} tried to modify message {} of {}", user_id, message_id, message.user_id);
        return Err(AppError::Forbidden("Only the author can modify this message".to_string()));
    }
    Ok(message)
}

/// `GET /api/messages?roomId=..&limit=50&offset=0`
#[instrument(skip_all)]
pub async fn list_messages(
    State(store): State<ChatStore>,
    QueryParams(query): QueryParams<MessagesQuery>,
) -> Result<Json<MessagePage>> {
    let room_id = non_empty(query.room_id)
        .ok_or_else(|| AppError::InvalidInput("Room ID is required".to_string()))?;
    find_room(&store, &room_id)?;

    let page = MessagePage::paginate(
        store.get_messages(&room_id),
        query.offset.unwrap_or(0),
        query.limit.unwrap_or(MessagesQuery::DEFAULT_LIMIT),
    );

    debug!("[MESSAGES] {} of {} messages from {}", page.messages.len(), page.total, room_id);
    Ok(Json(page))
}

/// `POST /api/messages`
///
/// # Returns
///
/// The stored message. The sender's typing indicator for the room is cleared.
///
/// # Errors
///
/// * 400 - missing field, empty, oversized or repetitive content
/// * 404 - unknown user or room
/// * 403 - sender is not a member of the room
#[instrument(skip_all)]
pub async fn send_message(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<SendMessageRequest>,
) -> Result<Json<MessageResponse>> {
    let (Some(content), Some(user_id), Some(room_id)) =
        (non_empty(req.content), non_empty(req.user_id), non_empty(req.room_id))
    else {
        return Err(AppError::InvalidInput("Content, userId, and roomId are required".to_string()));
    };

    validate_message(&content).map_err(AppError::InvalidInput)?;

    let user = find_user(&store, &user_id)?;
    let room = find_room(&store, &room_id)?;
    ensure_member(&room, &user.id, "User is not a member of this room")?;

    let message = Message {
        user_avatar: user.avatar.clone(),
        message_type: req.message_type.unwrap_or(MessageType::Text),
        reply_to: non_empty(req.reply_to),
        ..Message::text(&room.id, &user.id, &user.username, sanitize_message(&content))
    };

    let message = store.add_message(message)?;
    store.remove_typing_user(&user.id, &room.id);

    info!("[MESSAGES] {} posted {} in {}", user.id, message.id, room.id);
    Ok(Json(MessageResponse { message, success: true }))
}

/// `PUT /api/messages` - author-only content edit.
#[instrument(skip_all)]
pub async fn edit_message(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<EditMessageRequest>,
) -> Result<Json<MessageResponse>> {
    let (Some(message_id), Some(content), Some(room_id), Some(user_id)) = (
        non_empty(req.message_id),
        non_empty(req.content),
        non_empty(req.room_id),
        non_empty(req.user_id),
    ) else {
        return Err(AppError::InvalidInput(
            "MessageId, content, roomId, and userId are required".to_string(),
        ));
    };

    validate_message(&content).map_err(AppError::InvalidInput)?;
    own_message(&store, &room_id, &message_id, &user_id)?;

    let message = store
        .update_message(&message_id, &room_id, MessagePatch::edit(sanitize_message(&content)))
        .ok_or_else(|| AppError::NotFound("Message not found".to_string()))?;

    info!("[MESSAGES] {} edited {}", user_id, message_id);
    Ok(Json(MessageResponse { message, success: true }))
}

/// `DELETE /api/messages?messageId=..&roomId=..&userId=..`
///
/// Soft delete: the message stays in place with tombstone content and type
/// `system`.
#[instrument(skip_all)]
pub async fn delete_message(
    State(store): State<ChatStore>,
    QueryParams(query): QueryParams<DeleteMessageQuery>,
) -> Result<Json<SuccessResponse>> {
    let (Some(message_id), Some(room_id), Some(user_id)) =
        (non_empty(query.message_id), non_empty(query.room_id), non_empty(query.user_id))
    else {
        return Err(AppError::InvalidInput("MessageId, roomId, and userId are required".to_string()));
    };

    own_message(&store, &room_id, &message_id, &user_id)?;
    store.update_message(&message_id, &room_id, MessagePatch::tombstone());

    info!("[MESSAGES] {} deleted {}", user_id, message_id);
    Ok(Json(SuccessResponse::with_message("Message deleted")))
}

/// `GET /api/messages/search?q=..&roomId=..`
#[instrument(skip_all)]
pub async fn search_messages(
    State(store): State<ChatStore>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    let q = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Search query is required".to_string()))?;

    let messages = store.search_messages(&q, non_empty(query.room_id).as_deref());

    Ok(Json(SearchResponse {
        total: messages.len(),
        query: q,
        messages,
    }))
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::super::test_support::{call, test_app, ScriptedAi};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_room_create_send_edit_scenario() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (status, created) = call(&app, "POST", "/api/rooms", Some(json!({ "name": "Test", "userId": "user1" }))).await;
        assert_eq!(status, StatusCode::OK);
        let room_id = created["room"]["id"].as_str().unwrap().to_string();

        let (_, listed) = call(&app, "GET", "/api/rooms?userId=user1", None).await;
        let (_, sent) = call(
            &app,
            "POST",
            "/api/messages",
            Some(json!({ "content": "hi", "userId": "user1", "roomId": room_id })),
        )
        .await;
        let message_id = sent["message"]["id"].as_str().unwrap().to_string();

        let (status, edited) = call(
            &app,
            "PUT",
            "/api/messages",
            Some(json!({ "messageId": message_id, "content": "bye", "roomId": room_id, "userId": "user1" })),
        )
        .await;
        let (_, page) = call(&app, "GET", &format!("/api/messages?roomId={}", room_id), None).await;

        // Assert
        assert!(listed["rooms"].as_array().unwrap().iter().any(|r| r["id"] == room_id.as_str()));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["message"]["content"], "bye");
        assert_eq!(page["total"], 1);
        assert_eq!(page["messages"][0]["content"], "bye");
        assert_eq!(page["messages"][0]["edited"], true);
        assert!(page["messages"][0]["editedAt"].is_string());
    }

    #[tokio::test]
    async fn test_send_message_validation() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());
        let send = |body| call(&app, "POST", "/api/messages", Some(body));

        // Act
        let (missing, _) = send(json!({ "content": "hi", "userId": "user1" })).await;
        let (blank, body) = send(json!({ "content": "   ", "userId": "user1", "roomId": "general" })).await;
        let (no_user, _) = send(json!({ "content": "hi", "userId": "ghost", "roomId": "general" })).await;
        let (no_room, _) = send(json!({ "content": "hi", "userId": "user1", "roomId": "nowhere" })).await;
        let (outsider, _) = send(json!({ "content": "hi", "userId": "user2", "roomId": "ai-assistant" })).await;

        // Assert
        assert_eq!(missing, StatusCode::BAD_REQUEST);
        assert_eq!(blank, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message cannot be empty");
        assert_eq!(body["code"], "InvalidInput");
        assert_eq!(no_user, StatusCode::NOT_FOUND);
        assert_eq!(no_room, StatusCode::NOT_FOUND);
        assert_eq!(outsider, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let response = tower::ServiceExt::oneshot(
            app,
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/messages")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_query_is_json_bad_request() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (status, body) = call(&app, "GET", "/api/messages?roomId=general&limit=abc", None).await;

        // Assert
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "InvalidInput");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_send_sanitizes_and_clears_typing() {
        // Arrange
        let (app, store) = test_app(ScriptedAi::healthy());
        store.add_typing_user(lib_core::model::chat::TypingUser::human("user1", "John Doe", "general"));

        // Act
        let (status, body) = call(
            &app,
            "POST",
            "/api/messages",
            Some(json!({ "content": "hello <script>alert(1)</script>there", "userId": "user1", "roomId": "general" })),
        )
        .await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(!body["message"]["content"].as_str().unwrap().contains("script"));
        assert_eq!(body["message"]["username"], "John Doe");
        assert!(store.get_typing_users("general").is_empty());
        assert_eq!(store.get_messages("general").last().unwrap().id, body["message"]["id"]);
    }

    #[tokio::test]
    async fn test_edit_and_delete_are_author_only() {
        // Arrange
        let (app, store) = test_app(ScriptedAi::healthy());

        // Act
        let (edit_status, _) = call(
            &app,
            "PUT",
            "/api/messages",
            Some(json!({ "messageId": "msg1", "content": "mine now", "roomId": "general", "userId": "user2" })),
        )
        .await;
        let (foreign_delete, _) = call(&app, "DELETE", "/api/messages?messageId=msg1&roomId=general&userId=user2", None).await;
        let (unknown_delete, _) = call(&app, "DELETE", "/api/messages?messageId=nope&roomId=general&userId=user1", None).await;
        let (own_delete, _) = call(&app, "DELETE", "/api/messages?messageId=msg1&roomId=general&userId=user1", None).await;

        // Assert
        assert_eq!(edit_status, StatusCode::FORBIDDEN);
        assert_eq!(foreign_delete, StatusCode::FORBIDDEN);
        assert_eq!(unknown_delete, StatusCode::NOT_FOUND);
        assert_eq!(own_delete, StatusCode::OK);

        let deleted = store.get_message("general", "msg1").unwrap();
        assert_eq!(deleted.content, lib_core::model::chat::DELETED_MESSAGE_TOMBSTONE);
        assert_eq!(deleted.message_type, lib_core::model::chat::MessageType::System);
        assert_eq!(store.get_messages("general").len(), 2);
    }

    #[tokio::test]
    async fn test_list_pagination_and_errors() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (_, page) = call(&app, "GET", "/api/messages?roomId=general&limit=1&offset=0", None).await;
        let (missing, _) = call(&app, "GET", "/api/messages", None).await;
        let (unknown, _) = call(&app, "GET", "/api/messages?roomId=nowhere", None).await;

        // Assert
        assert_eq!(page["messages"].as_array().unwrap().len(), 1);
        assert_eq!(page["total"], 2);
        assert_eq!(page["hasMore"], true);
        assert_eq!(missing, StatusCode::BAD_REQUEST);
        assert_eq!(unknown, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_scoped_to_room() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (_, scoped) = call(&app, "GET", "/api/messages/search?q=HELP&roomId=code-help", None).await;
        let (_, everywhere) = call(&app, "GET", "/api/messages/search?q=help", None).await;
        let (empty, _) = call(&app, "GET", "/api/messages/search?q=%20", None).await;

        // Assert
        assert_eq!(scoped["total"], 1);
        assert_eq!(scoped["messages"][0]["id"], "msg4");
        assert_eq!(everywhere["total"], 2);
        assert_eq!(empty, StatusCode::BAD_REQUEST);
    }
}
// endregion: --- Tests
