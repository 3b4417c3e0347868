//! # Typing Indicator DTOs
//!
//! - `GET /api/typing?roomId=general` - [`TypingQuery`] -> [`TypingResponse`]
//! - `POST /api/typing` - [`TypingRequest`] -> [`TypingResponse`]
//!
//! Indicators expire on their own a few seconds after the last `POST`.

use serde::{Deserialize, Serialize};

use crate::model::chat::TypingUser;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingQuery {
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingRequest {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    /// `false` clears the indicator; defaults to `true`
    pub is_typing: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingResponse {
    pub room_id: String,
    pub typing_users: Vec<TypingUser>,
}
