use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::chat::{Message, Room, Sentiment, TypingUser, User};

/// Owned copy of every top-level collection of the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub current_user: Option<User>,
    pub current_room: Option<Room>,
    pub rooms: Vec<Room>,
    pub messages: HashMap<String, Vec<Message>>,
    pub users: HashMap<String, User>,
    pub typing_users: Vec<TypingUser>,
    pub online_users: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentCounts {
    fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }
}

/// Per-room message statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub ai_messages: usize,
    pub sentiments: SentimentCounts,
    /// Newest message timestamp, `None` for an empty room
    pub last_activity: Option<DateTime<Utc>>,
}

impl MessageStats {
    pub(super) fn from_messages(messages: &[Message]) -> Self {
        let total_messages = messages.len();
        let ai_messages = messages.iter().filter(|m| m.is_ai()).count();

        let mut sentiments = SentimentCounts::default();
        for analysis in messages.iter().filter_map(|m| m.ai_analysis.as_ref()) {
            sentiments.record(analysis.sentiment);
        }

        Self {
            total_messages,
            user_messages: total_messages - ai_messages,
            ai_messages,
            sentiments,
            last_activity: messages.iter().map(|m| m.timestamp).max(),
        }
    }
}
