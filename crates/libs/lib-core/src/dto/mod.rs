//! # Data Transfer Objects (DTOs)
//!
//! This module contains all data structures used for communication between
//! clients and the server via the REST API.

pub mod ai;
pub mod messages;
pub mod rooms;
pub mod typing;
pub mod users;

pub use ai::*;
pub use messages::*;
pub use rooms::*;
pub use typing::*;
pub use users::*;

use serde::Serialize;

/// Bare acknowledgement: `{ "success": true, "message": "..." }`.
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true, message: None }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
