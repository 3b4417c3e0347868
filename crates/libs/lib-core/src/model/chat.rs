//! # Chat Entities
//!
//! Users, rooms, messages and typing indicators as held by the
//! [`ChatStore`](super::store::ChatStore) and returned by the HTTP API.
//!
//! All entities serialize with camelCase field names. The `*Patch` types are
//! partial updates: only `Some` fields are merged into the target entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// region:    --- User

/// Presence status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Offline,
    Away,
}

/// Per-user AI feature toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPreferences {
    pub preferred_model: String,
    pub auto_translate: bool,
    pub show_sentiment: bool,
    pub enable_suggestions: bool,
}

impl Default for AiPreferences {
    fn default() -> Self {
        Self {
            preferred_model: "blenderbot".to_string(),
            auto_translate: false,
            show_sentiment: true,
            enable_suggestions: true,
        }
    }
}

/// User entity representing a registered chat participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub status: UserStatus,
    pub last_seen: DateTime<Utc>,
    pub ai_preferences: AiPreferences,
}

/// Partial update for a [`User`].
///
/// All fields are optional - only provided fields will be updated.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
    pub last_seen: Option<DateTime<Utc>>,
    pub ai_preferences: Option<AiPreferences>,
}

impl UserPatch {
    /// Create a new empty `UserPatch` instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    pub fn status(mut self, status: UserStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn last_seen(mut self, last_seen: DateTime<Utc>) -> Self {
        self.last_seen = Some(last_seen);
        self
    }

    pub fn ai_preferences(mut self, prefs: AiPreferences) -> Self {
        self.ai_preferences = Some(prefs);
        self
    }

    /// Merge the set fields into `user`.
    pub fn apply(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = Some(avatar);
        }
        if let Some(status) = self.status {
            user.status = status;
        }
        if let Some(last_seen) = self.last_seen {
            user.last_seen = last_seen;
        }
        if let Some(prefs) = self.ai_preferences {
            user.ai_preferences = prefs;
        }
    }
}

// endregion: --- User

// region:    --- Room

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoomType {
    General,
    AiAssistant,
    Private,
    Group,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::General => "general",
            RoomType::AiAssistant => "ai-assistant",
            RoomType::Private => "private",
            RoomType::Group => "group",
        }
    }
}

/// A named conversation channel with an ordered member set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Room {
    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

/// Partial update for a [`Room`].
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl RoomPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn apply(self, room: &mut Room) {
        if let Some(name) = self.name {
            room.name = name;
        }
        if let Some(description) = self.description {
            room.description = description;
        }
    }
}

// endregion: --- Room

// region:    --- Message

/// Content shown in place of a soft-deleted message.
pub const DELETED_MESSAGE_TOMBSTONE: &str = "[This message has been deleted]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    Text,
    AiResponse,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// Post-hoc classification attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAnalysis {
    pub sentiment: Sentiment,
    pub confidence: f64,
    pub toxicity: f64,
    pub topics: Vec<String>,
    pub language: String,
    pub model_used: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    pub room_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<MessageAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub edited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

impl Message {
    /// A plain text message stamped with the current time.
    pub fn text(
        room_id: impl Into<String>,
        user_id: impl Into<String>,
        username: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: lib_utils::generate_id(),
            content: content.into(),
            user_id: user_id.into(),
            username: username.into(),
            user_avatar: None,
            room_id: room_id.into(),
            timestamp: lib_utils::now_utc(),
            message_type: MessageType::Text,
            ai_analysis: None,
            reply_to: None,
            edited: false,
            edited_at: None,
        }
    }

    /// A `system` message authored by the `system` identity.
    pub fn system(room_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            message_type: MessageType::System,
            ..Self::text(room_id, "system", "System", content)
        }
    }

    pub fn is_ai(&self) -> bool {
        self.message_type == MessageType::AiResponse
    }
}

/// Partial update for a [`Message`].
#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub message_type: Option<MessageType>,
    pub ai_analysis: Option<MessageAnalysis>,
    pub edited: Option<bool>,
    pub edited_at: Option<DateTime<Utc>>,
}

impl MessagePatch {
    /// Content edit by the author.
    pub fn edit(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            edited: Some(true),
            edited_at: Some(lib_utils::now_utc()),
            ..Self::default()
        }
    }

    /// Soft delete: tombstone content and `system` type.
    pub fn tombstone() -> Self {
        Self {
            content: Some(DELETED_MESSAGE_TOMBSTONE.to_string()),
            message_type: Some(MessageType::System),
            ..Self::default()
        }
    }

    pub fn analysis(analysis: MessageAnalysis) -> Self {
        Self {
            ai_analysis: Some(analysis),
            ..Self::default()
        }
    }

    pub fn apply(self, message: &mut Message) {
        if let Some(content) = self.content {
            message.content = content;
        }
        if let Some(message_type) = self.message_type {
            message.message_type = message_type;
        }
        if let Some(analysis) = self.ai_analysis {
            message.ai_analysis = Some(analysis);
        }
        if let Some(edited) = self.edited {
            message.edited = edited;
        }
        if let Some(edited_at) = self.edited_at {
            message.edited_at = Some(edited_at);
        }
    }
}

// endregion: --- Message

// region:    --- Typing

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingType {
    Generating,
    Analyzing,
    Translating,
}

/// Ephemeral "is composing" marker, unique per (user, room).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingUser {
    pub user_id: String,
    pub username: String,
    pub room_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "isAI", default)]
    pub is_ai: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_type: Option<ProcessingType>,
}

impl TypingUser {
    pub fn human(user_id: impl Into<String>, username: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            room_id: room_id.into(),
            timestamp: lib_utils::now_utc(),
            is_ai: false,
            processing_type: None,
        }
    }

    pub fn ai(
        user_id: impl Into<String>,
        username: impl Into<String>,
        room_id: impl Into<String>,
        processing: ProcessingType,
    ) -> Self {
        Self {
            is_ai: true,
            processing_type: Some(processing),
            ..Self::human(user_id, username, room_id)
        }
    }
}

// endregion: --- Typing

// endregion: --- Tests
