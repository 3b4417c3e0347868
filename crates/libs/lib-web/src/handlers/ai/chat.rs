//! # AI Chat
//!
//! Generates an assistant reply for a room and stores it as an `ai-response`
//! message. While the call is in flight the assistant shows up as typing.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lib_ai::prompt::{format_ai_error, generate_contextual_prompt, sanitize_ai_response};
use lib_ai::AiClient;
use lib_core::dto::{
    AiChatFallback, AiChatRequest, AiChatResponse, AiServiceStatus, AiStatusQuery, ModelAvailability, ModelProbe,
};
use lib_core::model::ai::AiResponse;
use lib_core::model::chat::{Message, MessageType, ProcessingType, TypingUser};
use lib_core::model::store::{AI_BOT_ID, AI_BOT_NAME};
use lib_core::{AppError, ChatStore, Result};
use lib_utils::now_utc;
use tracing::{info, instrument, warn};

use super::CONTEXT_MESSAGES;
use crate::handlers::{ensure_member, find_room, find_user, non_empty, JsonBody, QueryParams};

/// Chat models reported by the status endpoint, with their kind.
const STATUS_MODELS: [(&str, &str); 4] = [
    ("blenderbot", "conversational"),
    ("gpt2-large", "text-generation"),
    ("codet5", "code-assistance"),
    ("flan-t5", "instruction-following"),
];

fn last_messages(store: &ChatStore, room_id: &str) -> Vec<Message> {
    let mut messages = store.get_messages(room_id);
    let skip = messages.len().saturating_sub(CONTEXT_MESSAGES);
    messages.drain(..skip);
    messages
}

/// `POST /api/ai/chat` - `{ message, userId, roomId, model? }`
///
/// The model is the explicit `model`, else the room's `aiModel`, else the
/// user's preference.
///
/// Concurrent calls in one room share a single AI typing indicator, so the
/// first call to finish clears it for the rest.
///
/// # Errors
///
/// * 400 - a required field is missing
/// * 404 - unknown user or room
/// * 403 - the user is not a room member
///
/// A failed generation is not an error: an apology message is stored and
/// returned with `success: false`.
#[instrument(skip_all)]
pub async fn post_chat(
    State(store): State<ChatStore>,
    State(ai): State<Arc<dyn AiClient>>,
    JsonBody(req): JsonBody<AiChatRequest>,
) -> Result<Response> {
    let (Some(message), Some(user_id), Some(room_id)) =
        (non_empty(req.message), non_empty(req.user_id), non_empty(req.room_id))
    else {
        return Err(AppError::InvalidInput("Message, userId, and roomId are required".to_string()));
    };

    let user = find_user(&store, &user_id)?;
    let room = find_room(&store, &room_id)?;
    ensure_member(&room, &user.id, "User not authorized for this room")?;

    let context = last_messages(&store, &room.id);
    let mut request = generate_contextual_prompt(&message, &user, &room, &context);
    if let Some(model) = non_empty(req.model).or_else(|| room.ai_model.clone()) {
        request.model = model;
    }

    store.add_typing_user(TypingUser::ai(AI_BOT_ID, AI_BOT_NAME, &room.id, ProcessingType::Generating));
    info!("[AI] generating in {} with {}", room.id, request.model);
    let result = ai.generate_text(&request).await;
    store.remove_typing_user(AI_BOT_ID, &room.id);

    match result {
        Ok(response) => {
            let response = AiResponse {
                content: sanitize_ai_response(&response.content),
                ..response
            };
            let message = store.add_ai_response(&room.id, response.clone())?;

            Ok(Json(AiChatResponse {
                success: true,
                response,
                message,
            })
            .into_response())
        }
        Err(e) => {
            warn!("[AI] generation failed in {}: {}", room.id, e);
            let error = format_ai_error(&e);

            let fallback = Message {
                message_type: MessageType::AiResponse,
                user_avatar: store.get_user(AI_BOT_ID).and_then(|bot| bot.avatar),
                ..Message::text(
                    &room.id,
                    AI_BOT_ID,
                    AI_BOT_NAME,
                    format!("I'm sorry, I encountered an error: {}", error),
                )
            };
            let fallback_message = store.add_message(fallback)?;

            Ok(Json(AiChatFallback {
                success: false,
                error,
                fallback_message,
            })
            .into_response())
        }
    }
}

/// `GET /api/ai/chat[?model=..]` - probe one model, or report the service.
#[instrument(skip_all)]
pub async fn get_status(State(ai): State<Arc<dyn AiClient>>, QueryParams(query): QueryParams<AiStatusQuery>) -> Response {
    let available = ai.test_connection().await;

    if let Some(model) = non_empty(query.model) {
        return Json(ModelProbe {
            model,
            available,
            tested: now_utc(),
        })
        .into_response();
    }

    let models: BTreeMap<String, ModelAvailability> = STATUS_MODELS
        .iter()
        .map(|(id, kind)| {
            (
                id.to_string(),
                ModelAvailability {
                    available,
                    kind: kind.to_string(),
                },
            )
        })
        .collect();

    Json(AiServiceStatus {
        status: if available { "online" } else { "offline" }.to_string(),
        models,
        last_checked: now_utc(),
    })
    .into_response()
}

// endregion: --- Tests
