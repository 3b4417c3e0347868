//! # User Data Transfer Objects
//!
//! Defines request and response structures for the user endpoints.
//!
//! ## Overview
//!
//! Identity is by claim: clients pass a `userId` with each request and there is
//! no credential check. "Login" just looks a user up by email or username and
//! marks them online.
//!
//! ## Endpoints Using These DTOs
//!
//! - `GET /api/users?userId=..` - [`UsersQuery`] -> [`UserResponse`] with a [`PublicUser`]
//! - `GET /api/users?roomId=..` / `GET /api/users` - [`UsersQuery`] -> [`UserListResponse`]
//! - `POST /api/users` - [`RegisterRequest`] -> [`UserResponse`]
//! - `PUT /api/users` - [`UpdateUserRequest`] -> [`UserResponse`]
//! - `PATCH /api/users` - [`LoginRequest`] -> [`UserResponse`]
//! - `DELETE /api/users?userId=..&action=logout` - [`UserActionQuery`] -> [`SuccessResponse`](super::SuccessResponse)
//!
//! ## Registration Example
//!
//! ```text
//! POST /api/users
//! Content-Type: application/json
//!
//! { "username": "alice", "email": "alice@example.com" }
//! ```
//!
//! Response:
//! ```text
//! {
//!   "success": true,
//!   "user": {
//!     "id": "5b0c...",
//!     "username": "alice",
//!     "email": "alice@example.com",
//!     "status": "online",
//!     "lastSeen": "2024-01-01T00:00:00Z",
//!     "aiPreferences": { "preferredModel": "blenderbot", ... }
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::chat::{AiPreferences, User, UserStatus};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub user_id: Option<String>,
    pub room_id: Option<String>,
}

/// User as shown to other users: everything but the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub status: UserStatus,
    pub last_seen: DateTime<Utc>,
    pub ai_preferences: AiPreferences,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            status: user.status,
            last_seen: user.last_seen,
            ai_preferences: user.ai_preferences,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicUserResponse {
    pub user: PublicUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
}

/// Registration request.
///
/// # Validation Rules (Server-Side)
///
/// - Username must be 3-20 characters of letters, digits, `_` or `-`
/// - Email must have the `local@domain.tld` shape
/// - Username and email must both be unique, ignoring case
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

/// Profile update: `{ "userId": "...", "updates": { ... } }`.
///
/// `updates` is kept as a raw JSON object so unknown keys can be reported
/// back by name before it is parsed into [`UserUpdates`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub updates: Map<String, Value>,
}

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdates {
    pub username: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
    pub ai_preferences: Option<AiPreferences>,
}

impl UserUpdates {
    /// Wire names accepted inside `updates`.
    pub const ALLOWED_FIELDS: [&'static str; 4] = ["username", "avatar", "status", "aiPreferences"];

    /// Keys of `updates` that are not in [`Self::ALLOWED_FIELDS`], in input order.
    pub fn invalid_fields(updates: &Map<String, Value>) -> Vec<String> {
        updates
            .keys()
            .filter(|k| !Self::ALLOWED_FIELDS.contains(&k.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActionQuery {
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub room_id: Option<String>,
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_invalid_fields_are_listed() {
        let updates = json!({ "username": "bob", "email": "x@y.z", "role": "admin" });
        let map = updates.as_object().unwrap();

        let mut invalid = UserUpdates::invalid_fields(map);
        invalid.sort();
        assert_eq!(invalid, vec!["email", "role"]);
    }

    #[test]
    fn test_public_user_hides_email() {
        let user = User {
            id: "u1".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar: None,
            status: UserStatus::Online,
            last_seen: Utc::now(),
            ai_preferences: AiPreferences::default(),
        };

        let value = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(value.get("email").is_none());
        assert_eq!(value["aiPreferences"]["preferredModel"], "blenderbot");
    }
}
// endregion: --- Tests
