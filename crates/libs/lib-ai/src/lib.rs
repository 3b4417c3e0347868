//! # AI Library
//!
//! Everything between a chat message and the hosted inference service:
//! the [`AiClient`] boundary, its Hugging Face implementation, the model
//! catalog, prompt construction and local keyword heuristics.

pub mod client;
pub mod error;
pub mod heuristics;
pub mod huggingface;
pub mod models;
pub mod prompt;

pub use client::AiClient;
pub use error::{AiError, Result};
pub use huggingface::HuggingFaceClient;
pub use models::{get_model_by_id, AiModel, Capability, DEFAULT_CHAT_MODEL};
