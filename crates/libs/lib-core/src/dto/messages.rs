//! # Message Data Transfer Objects
//!
//! Request and response bodies of the message endpoints.
//!
//! ## Endpoints Using These DTOs
//!
//! - `GET /api/messages?roomId=general&limit=50&offset=0` - [`MessagesQuery`] -> [`MessagePage`]
//! - `POST /api/messages` - [`SendMessageRequest`] -> [`MessageResponse`]
//! - `PUT /api/messages` - [`EditMessageRequest`] -> [`MessageResponse`]
//! - `DELETE /api/messages?messageId=..&roomId=..&userId=..` - [`DeleteMessageQuery`] -> [`SuccessResponse`](super::SuccessResponse)
//! - `GET /api/messages/search?q=hello&roomId=general` - [`SearchQuery`] -> [`SearchResponse`]
//!
//! ## Wire Format
//!
//! All DTOs use **camelCase** field names. Required request fields are still
//! declared as `Option` so a missing field is reported with a readable 400
//! message instead of a deserializer error.

use serde::{Deserialize, Serialize};

use crate::model::chat::{Message, MessageType};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesQuery {
    pub room_id: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl MessagesQuery {
    pub const DEFAULT_LIMIT: usize = 50;
}

/// One page of a room's messages.
///
/// ```json
/// { "messages": [ ... ], "total": 120, "hasMore": true }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub total: usize,
    pub has_more: bool,
}

impl MessagePage {
    /// Slice `messages[offset..offset + limit]`, clamped to the list.
    pub fn paginate(messages: Vec<Message>, offset: usize, limit: usize) -> Self {
        let total = messages.len();
        let page = messages.into_iter().skip(offset).take(limit).collect();

        Self {
            messages: page,
            total,
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: Option<String>,
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<MessageType>,
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageRequest {
    pub message_id: Option<String>,
    pub content: Option<String>,
    pub room_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageQuery {
    pub message_id: Option<String>,
    pub room_id: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: Message,
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub messages: Vec<Message>,
    pub total: usize,
}

// endregion: --- Tests
