//! # Utilities Library
//!
//! Shared helpers for environment variables, ids, time and input validation.

pub mod envs;
pub mod ids;
pub mod time;
pub mod validation;

// Re-export commonly used functions
pub use envs::{get_env, get_env_bool, get_env_list, get_env_or, get_env_parse};
pub use ids::{generate_id, generate_prefixed_id};
pub use time::now_utc;
pub use validation::{
    is_valid_email, is_valid_username, sanitize_message, validate_char_range,
    validate_message,
};
