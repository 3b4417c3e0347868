//! # Typing Handlers
//!
//! Polling surface for typing indicators. Clients `POST` while composing and
//! poll `GET`; indicators expire on their own after the store's TTL.

use axum::extract::State;
use axum::Json;
use lib_core::dto::{TypingQuery, TypingRequest, TypingResponse};
use lib_core::model::chat::TypingUser;
use lib_core::{AppError, ChatStore, Result};
use tracing::{debug, instrument};

use super::{ensure_member, find_room, find_user, non_empty, JsonBody, QueryParams};

fn typing_response(store: &ChatStore, room_id: String) -> TypingResponse {
    TypingResponse {
        typing_users: store.get_typing_users(&room_id),
        room_id,
    }
}

/// `GET /api/typing?roomId=..`
#[instrument(skip_all)]
pub async fn get_typing(State(store): State<ChatStore>, QueryParams(query): QueryParams<TypingQuery>) -> Result<Json<TypingResponse>> {
    let room_id = non_empty(query.room_id).ok_or_else(|| AppError::InvalidInput("Room ID is required".to_string()))?;
    find_room(&store, &room_id)?;

    Ok(Json(typing_response(&store, room_id)))
}

/// `POST /api/typing` - `{ userId, roomId, isTyping? }`
#[instrument(skip_all)]
pub async fn set_typing(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<TypingRequest>,
) -> Result<Json<TypingResponse>> {
    let (Some(user_id), Some(room_id)) = (non_empty(req.user_id), non_empty(req.room_id)) else {
        return Err(AppError::InvalidInput("UserId and roomId are required".to_string()));
    };

    let user = find_user(&store, &user_id)?;
    let room = find_room(&store, &room_id)?;
    ensure_member(&room, &user.id, "User is not a member of this room")?;

    if req.is_typing.unwrap_or(true) {
        store.add_typing_user(TypingUser::human(&user.id, &user.username, &room.id));
    } else {
        store.remove_typing_user(&user.id, &room.id);
    }

    debug!("[TYPING] {} in {}: {}", user.id, room.id, req.is_typing.unwrap_or(true));
    Ok(Json(typing_response(&store, room_id)))
}

// endregion: --- Tests
