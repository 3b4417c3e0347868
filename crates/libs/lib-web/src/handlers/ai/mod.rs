//! # AI Handlers
//!
//! Endpoints backed by the [`AiClient`](lib_ai::AiClient):
//!
//! - [`chat`]: `POST /api/ai/chat` completion, `GET /api/ai/chat` service status
//! - [`models`]: `GET /api/ai/models` catalog
//! - [`analyze`]: `POST|PUT /api/ai/analyze` sentiment and moderation
//! - [`suggest`]: `POST|GET /api/ai/suggest` input suggestions and smart replies
//! - [`translate`]: `POST|PUT|GET /api/ai/translate`
//!
//! Upstream failures are never HTTP errors here: each handler answers 200
//! with `success: false` and a fallback payload.

pub mod analyze;
pub mod chat;
pub mod models;
pub mod suggest;
pub mod translate;

/// Messages of history handed to prompts and suggestion heuristics.
const CONTEXT_MESSAGES: usize = 10;
