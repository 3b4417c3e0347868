//! # AI Client Errors

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AiError>;

/// Failures talking to the inference service.
///
/// Nothing is retried: every variant is returned to the caller as is.
#[derive(Debug, Error)]
pub enum AiError {
    /// Transport failure: connect, timeout or body read.
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("Hugging Face API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// The requested catalog model does not exist.
    #[error("Model {0} not found")]
    UnknownModel(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl AiError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            AiError::Api { status, body } => *status == 429 || body.to_lowercase().contains("rate limit"),
            _ => false,
        }
    }
}

impl From<AiError> for lib_core::AppError {
    fn from(err: AiError) -> Self {
        lib_core::AppError::Upstream(err.to_string())
    }
}
