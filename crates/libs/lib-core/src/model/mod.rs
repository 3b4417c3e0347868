//! # Domain Model
//!
//! Chat entities, AI exchange types and the in-memory [`store::ChatStore`].

pub mod ai;
pub mod chat;
pub mod store;

pub use chat::{
    AiPreferences, Message, MessageAnalysis, MessagePatch, MessageType, ProcessingType, Room,
    RoomPatch, RoomType, Sentiment, TypingUser, User, UserPatch, UserStatus,
};
