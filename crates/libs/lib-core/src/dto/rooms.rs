//! # Room Data Transfer Objects
//!
//! - `GET /api/rooms?userId=user1&type=group` - [`RoomsQuery`] -> [`RoomListResponse`]
//! - `POST /api/rooms` - [`CreateRoomRequest`] -> [`RoomResponse`]
//! - `PUT /api/rooms` - [`UpdateRoomRequest`] -> [`RoomResponse`]
//! - `PATCH /api/rooms` - [`RoomActionRequest`] -> [`RoomResponse`]
//! - `GET /api/rooms/{roomId}/stats` -> [`MessageStats`]

use serde::{Deserialize, Serialize};

use crate::model::chat::{Message, Room, RoomType};
use crate::model::store::MessageStats;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomsQuery {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
}

/// A room as listed for a member, with message counters.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    #[serde(flatten)]
    pub room: Room,
    pub message_count: usize,
    /// `null` for a room without messages
    pub last_message: Option<Message>,
    pub stats: MessageStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    pub user_id: Option<String>,
    pub ai_model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    pub room_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomAction {
    Join,
    Leave,
}

/// Join or leave. `action` stays a raw string so an unknown value gets the
/// dedicated error message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomActionRequest {
    pub room_id: Option<String>,
    pub user_id: Option<String>,
    pub action: Option<String>,
}

impl RoomActionRequest {
    pub fn parsed_action(&self) -> Option<RoomAction> {
        match self.action.as_deref()? {
            "join" => Some(RoomAction::Join),
            "leave" => Some(RoomAction::Leave),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomResponse {
    pub room: Room,
    pub success: bool,
}
