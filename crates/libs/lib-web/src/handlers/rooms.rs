//! # Room Handlers
//!
//! Listing (members only), creation, rename, join/leave and per-room stats.

use axum::extract::{Path, State};
use axum::Json;
use lib_core::dto::{
    CreateRoomRequest, RoomAction, RoomActionRequest, RoomListResponse, RoomResponse, RoomSummary,
    RoomsQuery, UpdateRoomRequest,
};
use lib_core::model::chat::{Message, MessageType, Room, RoomPatch, RoomType};
use lib_core::model::store::{MessageStats, AI_BOT_ID, AI_BOT_NAME};
use lib_core::{AppError, ChatStore, Result};
use lib_utils::{generate_id, now_utc, validate_char_range};
use tracing::{info, instrument};

use super::{ensure_member, find_room, find_user, non_empty, JsonBody, QueryParams};

fn validate_room_name(name: &str) -> Result<()> {
    validate_char_range(name, 1, 50, "Room name").map_err(AppError::InvalidInput)
}

fn summarize(store: &ChatStore, room: Room) -> RoomSummary {
    let messages = store.get_messages(&room.id);
    let stats = store.get_message_stats(&room.id);

    RoomSummary {
        message_count: messages.len(),
        last_message: messages.last().cloned(),
        stats,
        room,
    }
}

/// `GET /api/rooms?userId=..&type=..`
///
/// Rooms the user belongs to, most recently active first.
#[instrument(skip_all)]
pub async fn list_rooms(
    State(store): State<ChatStore>,
    QueryParams(query): QueryParams<RoomsQuery>,
) -> Result<Json<RoomListResponse>> {
    let user_id = non_empty(query.user_id)
        .ok_or_else(|| AppError::InvalidInput("User ID is required".to_string()))?;

    let mut rooms: Vec<Room> = store
        .get_rooms()
        .into_iter()
        .filter(|room| room.is_member(&user_id))
        .filter(|room| query.room_type.map_or(true, |t| room.room_type == t))
        .collect();
    rooms.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

    let rooms = rooms.into_iter().map(|room| summarize(&store, room)).collect();
    Ok(Json(RoomListResponse { rooms }))
}

/// `POST /api/rooms`
///
/// The creator becomes the only member. AI-assistant rooms open with a
/// welcome message from the assistant.
#[instrument(skip_all)]
pub async fn create_room(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<CreateRoomRequest>,
) -> Result<Json<RoomResponse>> {
    let (Some(name), Some(user_id)) = (non_empty(req.name), non_empty(req.user_id)) else {
        return Err(AppError::InvalidInput("Name and userId are required".to_string()));
    };
    validate_room_name(&name)?;
    let user = find_user(&store, &user_id)?;

    let room_type = req.room_type.unwrap_or(RoomType::Group);
    let now = now_utc();
    let room = Room {
        id: generate_id(),
        name,
        description: req.description.unwrap_or_default(),
        room_type,
        thumbnail: Some(format!("/rooms/{}.png", room_type.as_str())),
        members: vec![user.id.clone()],
        ai_model: non_empty(req.ai_model),
        created_at: now,
        last_activity: now,
    };
    store.add_room(room.clone());

    if room_type == RoomType::AiAssistant {
        let welcome = Message {
            message_type: MessageType::AiResponse,
            user_avatar: store.get_user(AI_BOT_ID).and_then(|bot| bot.avatar),
            ..Message::text(
                &room.id,
                AI_BOT_ID,
                AI_BOT_NAME,
                format!("Welcome to {}! I'm your AI assistant. How can I help you today?", room.name),
            )
        };
        store.add_message(welcome)?;
    }

    info!("[ROOMS] {} created {} ({})", user.id, room.id, room_type.as_str());
    let room = store.get_room(&room.id).unwrap_or(room);
    Ok(Json(RoomResponse { room, success: true }))
}

/// `PUT /api/rooms` - rename or re-describe; any member may do it.
#[instrument(skip_all)]
pub async fn update_room(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<UpdateRoomRequest>,
) -> Result<Json<RoomResponse>> {
    let (Some(room_id), Some(user_id)) = (non_empty(req.room_id), non_empty(req.user_id)) else {
        return Err(AppError::InvalidInput("RoomId and userId are required".to_string()));
    };

    let room = find_room(&store, &room_id)?;
    ensure_member(&room, &user_id, "Only room members can update the room")?;

    let patch = RoomPatch {
        name: non_empty(req.name),
        description: req.description,
    };
    if let Some(name) = &patch.name {
        validate_room_name(name)?;
    }
    if patch.is_empty() {
        return Ok(Json(RoomResponse { room, success: true }));
    }

    let room = store.update_room(&room_id, patch).ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    info!("[ROOMS] {} updated {}", user_id, room_id);
    Ok(Json(RoomResponse { room, success: true }))
}

/// `PATCH /api/rooms` - `{ roomId, userId, action: "join" | "leave" }`
///
/// A `System` message announces every actual membership change.
#[instrument(skip_all)]
pub async fn room_action(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<RoomActionRequest>,
) -> Result<Json<RoomResponse>> {
    let parsed = req.parsed_action();
    let (Some(room_id), Some(user_id), Some(_)) = (non_empty(req.room_id), non_empty(req.user_id), req.action) else {
        return Err(AppError::InvalidInput("RoomId, userId, and action are required".to_string()));
    };
    let action =
        parsed.ok_or_else(|| AppError::InvalidInput(r#"Action must be either "join" or "leave""#.to_string()))?;

    find_room(&store, &room_id)?;
    let user = find_user(&store, &user_id)?;

    let announcement = match action {
        RoomAction::Join if store.add_member(&room_id, &user.id) => Some(format!("{} joined the room", user.username)),
        RoomAction::Leave if store.remove_member(&room_id, &user.id) => Some(format!("{} left the room", user.username)),
        _ => None,
    };

    if let Some(content) = announcement {
        info!("[ROOMS] {}", content);
        store.add_message(Message::system(&room_id, content))?;
    }

    let room = find_room(&store, &room_id)?;
    Ok(Json(RoomResponse { room, success: true }))
}

/// `GET /api/rooms/{roomId}/stats`
pub async fn room_stats(State(store): State<ChatStore>, Path(room_id): Path<String>) -> Result<Json<MessageStats>> {
    find_room(&store, &room_id)?;
    Ok(Json(store.get_message_stats(&room_id)))
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::super::test_support::{call, test_app, ScriptedAi};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_rooms_for_member() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (_, all) = call(&app, "GET", "/api/rooms?userId=user1", None).await;
        let (_, assistants) = call(&app, "GET", "/api/rooms?userId=user1&type=ai-assistant", None).await;
        let (_, other) = call(&app, "GET", "/api/rooms?userId=user2", None).await;
        let (missing, _) = call(&app, "GET", "/api/rooms", None).await;

        // Assert
        assert_eq!(all["rooms"].as_array().unwrap().len(), 3);
        assert_eq!(assistants["rooms"].as_array().unwrap().len(), 2);
        assert_eq!(other["rooms"].as_array().unwrap().len(), 1);
        assert_eq!(other["rooms"][0]["id"], "general");
        assert_eq!(other["rooms"][0]["messageCount"], 2);
        assert_eq!(other["rooms"][0]["lastMessage"]["id"], "msg2");
        assert_eq!(other["rooms"][0]["stats"]["totalMessages"], 2);
        assert_eq!(missing, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_room_rules() {
        // Arrange
        let (app, store) = test_app(ScriptedAi::healthy());

        // Act
        let (too_long, _) = call(&app, "POST", "/api/rooms", Some(json!({ "name": "x".repeat(51), "userId": "user1" }))).await;
        let (no_user, _) = call(&app, "POST", "/api/rooms", Some(json!({ "name": "Mine", "userId": "ghost" }))).await;
        let (_, group) = call(&app, "POST", "/api/rooms", Some(json!({ "name": "Mine", "userId": "user2" }))).await;
        let (_, bot) = call(
            &app,
            "POST",
            "/api/rooms",
            Some(json!({ "name": "Helper", "userId": "user2", "type": "ai-assistant", "aiModel": "flan-t5" })),
        )
        .await;

        // Assert
        assert_eq!(too_long, StatusCode::BAD_REQUEST);
        assert_eq!(no_user, StatusCode::NOT_FOUND);
        assert_eq!(group["room"]["type"], "group");
        assert_eq!(group["room"]["members"], json!(["user2"]));
        assert_eq!(group["room"]["description"], "");

        let bot_room = bot["room"]["id"].as_str().unwrap();
        let welcome = store.get_messages(bot_room);
        assert_eq!(bot["room"]["aiModel"], "flan-t5");
        assert_eq!(welcome.len(), 1);
        assert_eq!(welcome[0].content, "Welcome to Helper! I'm your AI assistant. How can I help you today?");
        assert!(welcome[0].is_ai());
    }

    #[tokio::test]
    async fn test_update_room_persists() {
        // Arrange
        let (app, store) = test_app(ScriptedAi::healthy());

        // Act
        let (outsider, _) = call(&app, "PUT", "/api/rooms", Some(json!({ "roomId": "ai-assistant", "userId": "user2", "name": "Mine" }))).await;
        let (status, body) = call(
            &app,
            "PUT",
            "/api/rooms",
            Some(json!({ "roomId": "general", "userId": "user2", "name": "Lobby", "description": "" })),
        )
        .await;

        // Assert
        assert_eq!(outsider, StatusCode::FORBIDDEN);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["room"]["name"], "Lobby");
        let room = store.get_room("general").unwrap();
        assert_eq!(room.name, "Lobby");
        assert_eq!(room.description, "");
    }

    #[tokio::test]
    async fn test_join_and_leave_announce() {
        // Arrange
        let (app, store) = test_app(ScriptedAi::healthy());
        let action = |verb: &'static str| {
            call(&app, "PATCH", "/api/rooms", Some(json!({ "roomId": "ai-assistant", "userId": "user2", "action": verb })))
        };

        // Act
        let (_, joined) = action("join").await;
        let (_, _) = action("join").await;
        let (_, left) = action("leave").await;
        let (bad, _) = action("dance").await;

        // Assert
        assert!(joined["room"]["members"].as_array().unwrap().contains(&json!("user2")));
        assert!(!left["room"]["members"].as_array().unwrap().contains(&json!("user2")));
        assert_eq!(bad, StatusCode::BAD_REQUEST);

        let notices: Vec<String> = store
            .get_messages("ai-assistant")
            .into_iter()
            .filter(|m| m.user_id == "system")
            .map(|m| m.content)
            .collect();
        assert_eq!(notices, vec!["Jane Smith joined the room", "Jane Smith left the room"]);
    }

    #[tokio::test]
    async fn test_room_stats() {
        // Arrange
        let (app, _store) = test_app(ScriptedAi::healthy());

        // Act
        let (status, stats) = call(&app, "GET", "/api/rooms/general/stats", None).await;
        let (unknown, _) = call(&app, "GET", "/api/rooms/nowhere/stats", None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["totalMessages"], 2);
        assert_eq!(stats["userMessages"], 2);
        assert_eq!(stats["sentiments"]["positive"], 1);
        assert_eq!(unknown, StatusCode::NOT_FOUND);
    }
}
// endregion: --- Tests
