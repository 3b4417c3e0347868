//! # HTTP Request Handlers
//!
//! Axum handlers for the `/api` surface, one module per resource.
//!
//! ## Handler Modules
//!
//! - **[`messages`]**: room history, posting, editing, soft delete and search
//!   - `GET|POST|PUT|DELETE /api/messages`
//!   - `GET /api/messages/search`
//! - **[`rooms`]**: membership-filtered listing, creation, rename, join/leave
//!   - `GET|POST|PUT|PATCH /api/rooms`
//!   - `GET /api/rooms/{roomId}/stats`
//! - **[`users`]**: lookup, registration, profile updates, login and logout
//!   - `GET|POST|PUT|PATCH|DELETE /api/users`
//! - **[`typing`]**: polling surface for typing indicators
//!   - `GET|POST /api/typing`
//! - **[`ai`]**: chat completion, analysis, suggestions and translation
//!   - `/api/ai/chat`, `/api/ai/models`, `/api/ai/analyze`, `/api/ai/suggest`, `/api/ai/translate`
//!
//! ## Handler Architecture
//!
//! Handlers pull what they need out of [`AppState`](crate::AppState) with
//! `State<ChatStore>` / `State<Arc<dyn AiClient>>` and return
//! `Result<Json<_>, AppError>`. Request bodies go through [`JsonBody`] and query
//! strings through [`QueryParams`], so malformed input is a 400 with the usual
//! `{error, code}` body.
//!
//! Identity is by claim: the `userId` in the request is trusted.

pub mod ai;
pub mod messages;
pub mod rooms;
pub mod typing;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Json,
};
use lib_core::dto::HealthResponse;
use lib_core::model::chat::{Room, User};
use lib_core::{AppError, ChatStore, Result};
use serde::de::DeserializeOwned;

// region: --- Extractors

/// JSON request body.
///
/// Unlike `axum::Json` every failure (missing content type, syntax error,
/// wrong field type) is reported as [`AppError::InvalidInput`].
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::InvalidInput(e.body_text()))?;

        Ok(Self(serde_json::from_slice(&bytes)?))
    }
}

/// Query string, with parse failures reported as [`AppError::InvalidInput`].
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidInput(e.body_text()))?;

        Ok(Self(value))
    }
}

// endregion: --- Extractors

// region: --- Lookups

/// `None` for absent and empty strings.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn find_user(store: &ChatStore, user_id: &str) -> Result<User> {
    store
        .get_user(user_id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub(crate) fn find_room(store: &ChatStore, room_id: &str) -> Result<Room> {
    store
        .get_room(room_id)
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))
}

pub(crate) fn ensure_member(room: &Room, user_id: &str, message: &str) -> Result<()> {
    if room.is_member(user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

// endregion: --- Lookups

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
