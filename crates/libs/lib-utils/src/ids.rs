//! # Identifiers
//!
//! Random identifiers for users, rooms and messages.

use uuid::Uuid;

/// Generate a new random identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a random identifier carrying a short prefix, e.g. `ai_3f2c...`.
pub fn generate_prefixed_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}
