//! # Web Library
//!
//! HTTP handlers, middleware and server setup for the chat API.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{build_state, create_router, start_server, AppState};
