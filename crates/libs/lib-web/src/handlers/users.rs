//! # User Handlers
//!
//! Lookup, registration, profile updates, login and logout.
//!
//! There are no credentials: registering or logging in simply makes the user
//! the store's current user and marks them online. Emails are only returned
//! to the user they belong to (registration, update and login answers).

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lib_core::dto::{
    LoginRequest, PublicUser, PublicUserResponse, RegisterRequest, SuccessResponse, UpdateUserRequest,
    UserActionQuery, UserListResponse, UserResponse, UserUpdates, UsersQuery,
};
use lib_core::model::chat::{AiPreferences, User, UserPatch, UserStatus};
use lib_core::{AppError, ChatStore, Result};
use lib_utils::{generate_id, is_valid_email, is_valid_username, now_utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{find_room, find_user, non_empty, JsonBody, QueryParams};

const DEFAULT_AVATAR: &str = "/avatars/default.png";

fn public_users(store: &ChatStore, ids: &[String]) -> Vec<PublicUser> {
    ids.iter()
        .filter_map(|id| store.get_user(id))
        .map(PublicUser::from)
        .collect()
}

/// `GET /api/users`
///
/// * `?userId=..` - that user, as `{ user }`
/// * `?roomId=..` - the room's members, as `{ users }`
/// * neither - the online users, as `{ users }`
#[instrument(skip_all)]
pub async fn get_users(State(store): State<ChatStore>, QueryParams(query): QueryParams<UsersQuery>) -> Result<Response> {
    if let Some(user_id) = non_empty(query.user_id) {
        let user = find_user(&store, &user_id)?;
        return Ok(Json(PublicUserResponse { user: user.into() }).into_response());
    }

    let users = match non_empty(query.room_id) {
        Some(room_id) => public_users(&store, &find_room(&store, &room_id)?.members),
        None => public_users(&store, &store.online_users()),
    };

    Ok(Json(UserListResponse { users }).into_response())
}

/// `POST /api/users` - registration.
///
/// # Errors
///
/// * 400 - missing field, malformed username or email
/// * 409 - username or email already used, ignoring case
#[instrument(skip_all)]
pub async fn register(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    let (Some(username), Some(email)) = (non_empty(req.username), non_empty(req.email)) else {
        return Err(AppError::InvalidInput("Username and email are required".to_string()));
    };

    if !is_valid_username(&username) {
        return Err(AppError::InvalidInput(
            "Username must be 3-20 characters and contain only letters, numbers, _ or -".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(AppError::InvalidInput("Invalid email format".to_string()));
    }

    if store.username_taken(&username, None) {
        warn!("[USERS] username already taken: {}", username);
        return Err(AppError::Conflict("Username already exists".to_string()));
    }
    if store.email_taken(&email) {
        warn!("[USERS] email already registered: {}", email);
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let user = User {
        id: generate_id(),
        username,
        email,
        avatar: Some(non_empty(req.avatar).unwrap_or_else(|| DEFAULT_AVATAR.to_string())),
        status: UserStatus::Online,
        last_seen: now_utc(),
        ai_preferences: AiPreferences::default(),
    };
    store.set_current_user(Some(user.clone()));

    info!("[USERS] registered {} ({})", user.username, user.id);
    Ok(Json(UserResponse {
        success: true,
        user,
        message: None,
    }))
}

/// `PUT /api/users` - `{ userId, updates: { username?, avatar?, status?, aiPreferences? } }`
#[instrument(skip_all)]
pub async fn update_user(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    let user_id = non_empty(req.user_id).ok_or_else(|| AppError::InvalidInput("UserId is required".to_string()))?;
    let user = find_user(&store, &user_id)?;

    let invalid = UserUpdates::invalid_fields(&req.updates);
    if !invalid.is_empty() {
        return Err(AppError::InvalidInput(format!("Invalid update fields: {}", invalid.join(", "))));
    }
    let updates: UserUpdates = serde_json::from_value(Value::Object(req.updates))?;

    let mut patch = UserPatch::new().last_seen(now_utc());

    if let Some(username) = updates.username.filter(|u| *u != user.username) {
        if !is_valid_username(&username) {
            return Err(AppError::InvalidInput("Invalid username format".to_string()));
        }
        if store.username_taken(&username, Some(&user.id)) {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        patch = patch.username(username);
    }
    if let Some(avatar) = updates.avatar {
        patch = patch.avatar(avatar);
    }
    if let Some(status) = updates.status {
        patch = patch.status(status);
    }
    if let Some(prefs) = updates.ai_preferences {
        patch = patch.ai_preferences(prefs);
    }

    let user = store
        .update_user(&user.id, patch)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    debug!("[USERS] updated profile of {}", user.id);
    Ok(Json(UserResponse {
        success: true,
        user,
        message: None,
    }))
}

/// `PATCH /api/users` - log in by email or username, case-insensitive.
#[instrument(skip_all)]
pub async fn login(
    State(store): State<ChatStore>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<UserResponse>> {
    let (email, username) = (non_empty(req.email), non_empty(req.username));
    if email.is_none() && username.is_none() {
        return Err(AppError::InvalidInput("Email or username is required".to_string()));
    }

    let user = store
        .find_user_by_login(email.as_deref(), username.as_deref())
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let patch = UserPatch::new().status(UserStatus::Online).last_seen(now_utc());
    let user = store.update_user(&user.id, patch).unwrap_or(user);
    store.set_current_user(Some(user.clone()));

    info!("[USERS] {} logged in", user.id);
    Ok(Json(UserResponse {
        success: true,
        user,
        message: Some("Login successful".to_string()),
    }))
}

/// `DELETE /api/users?userId=..&action=logout|typing-stop&roomId=..`
#[instrument(skip_all)]
pub async fn user_action(
    State(store): State<ChatStore>,
    QueryParams(query): QueryParams<UserActionQuery>,
) -> Result<Json<SuccessResponse>> {
    let user_id = non_empty(query.user_id).ok_or_else(|| AppError::InvalidInput("UserId is required".to_string()))?;

    match (query.action.as_deref(), non_empty(query.room_id)) {
        (Some("logout"), _) => {
            let patch = UserPatch::new().status(UserStatus::Offline).last_seen(now_utc());
            store
                .update_user(&user_id, patch)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            store.remove_online_user(&user_id);

            if store.current_user().is_some_and(|u| u.id == user_id) {
                store.set_current_user(None);
            }

            info!("[USERS] {} logged out", user_id);
            Ok(Json(SuccessResponse::with_message("User logged out")))
        }
        (Some("typing-stop"), Some(room_id)) => {
            store.remove_typing_user(&user_id, &room_id);
            Ok(Json(SuccessResponse::with_message("Typing indicator removed")))
        }
        _ => Err(AppError::InvalidInput("Invalid action or missing parameters".to_string())),
    }
}

// endregion: --- Tests
