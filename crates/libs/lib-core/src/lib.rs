//! # Core Library
//!
//! Domain model, in-memory chat store, API DTOs, configuration and the
//! application error type.

pub mod config;
pub mod dto;
pub mod error;
pub mod model;

// Re-export commonly used types
pub use config::{Config, StoreConfig};
pub use error::{AppError, Result};
pub use model::store::{ChatStore, StoreEvent, Subscription};
