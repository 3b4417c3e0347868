//! # Chat Store
//!
//! Process-wide, in-memory chat state: users, rooms, per-room message lists,
//! typing indicators and the online-user list.
//!
//! [`ChatStore`] is a cheaply clonable handle; all clones share the same state.
//! Every method is synchronous. Mutations take an internal lock, release it, and
//! then notify subscribers in registration order before returning, so a listener
//! may read from the store it is subscribed to.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lib_core::config::StoreConfig;
//! use lib_core::model::chat::Message;
//! use lib_core::model::store::ChatStore;
//!
//! # fn example() -> lib_core::Result<()> {
//! let store = ChatStore::with_sample_data(StoreConfig::default());
//!
//! let sub = store.subscribe(|event| println!("store changed: {:?}", event));
//! store.add_message(Message::text("general", "user1", "John Doe", "hello"))?;
//! sub.unsubscribe();
//!
//! assert_eq!(store.search_messages("hello", Some("general")).len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Typing indicators
//!
//! Each (user, room) pair has at most one indicator. Adding one (re)starts a
//! tokio timer for that key; when it fires without a newer event the indicator
//! is removed. Outside a tokio runtime indicators never expire on their own.

// region: --- Modules
mod events;
mod seed;
mod snapshot;

// endregion: --- Modules

// region: --- Re-exports
pub use events::{StoreEvent, Subscription};
pub use snapshot::{ChatSnapshot, MessageStats, SentimentCounts};
// endregion: --- Re-exports

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{AppError, Result};
use crate::model::ai::AiResponse;
use crate::model::chat::{
    Message, MessageAnalysis, MessagePatch, MessageType, Room, RoomPatch, Sentiment, TypingUser,
    User, UserPatch,
};
use events::{Listener, Listeners};

/// Identity used for AI generated messages.
pub const AI_BOT_ID: &str = "ai-bot";
pub const AI_BOT_NAME: &str = "AI Assistant";

type TypingKey = (String, String);

struct TypingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct State {
    current_user_id: Option<String>,
    current_room_id: Option<String>,
    rooms: Vec<Room>,
    messages: HashMap<String, Vec<Message>>,
    users: HashMap<String, User>,
    typing_users: Vec<TypingUser>,
    online_users: Vec<String>,
    typing_timers: HashMap<TypingKey, TypingTimer>,
    timer_generation: u64,
}

impl State {
    fn room_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == room_id)
    }

    fn cancel_typing_timer(&mut self, key: &TypingKey) {
        if let Some(timer) = self.typing_timers.remove(key) {
            timer.handle.abort();
        }
    }

    fn remove_typing(&mut self, user_id: &str, room_id: &str) {
        self.typing_users
            .retain(|t| !(t.user_id == user_id && t.room_id == room_id));
    }
}

struct Inner {
    config: StoreConfig,
    state: Mutex<State>,
    listeners: Arc<Mutex<Listeners>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, timer) in state.typing_timers.drain() {
            timer.handle.abort();
        }
    }
}

/// Shared handle to the in-memory chat state.
#[derive(Clone)]
pub struct ChatStore {
    inner: Arc<Inner>,
}

impl ChatStore {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                state: Mutex::new(State::default()),
                listeners: Arc::new(Mutex::new(Listeners::default())),
            }),
        }
    }

    /// Create a store seeded with demo users, rooms and messages.
    pub fn with_sample_data(config: StoreConfig) -> Self {
        let store = Self::new(config);
        {
            let mut state = store.state();
            seed::populate(&mut state);
        }
        store
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: StoreEvent) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();

        for listener in listeners {
            listener(&event);
        }
    }

    // region: --- State & Subscriptions

    /// Owned copy of all top-level collections.
    pub fn get_state(&self) -> ChatSnapshot {
        let state = self.state();
        ChatSnapshot {
            current_user: state
                .current_user_id
                .as_ref()
                .and_then(|id| state.users.get(id).cloned()),
            current_room: state
                .current_room_id
                .as_ref()
                .and_then(|id| state.rooms.iter().find(|r| &r.id == id).cloned()),
            rooms: state.rooms.clone(),
            messages: state.messages.clone(),
            users: state.users.clone(),
            typing_users: state.typing_users.clone(),
            online_users: state.online_users.clone(),
        }
    }

    /// Register a listener called after every mutation.
    ///
    /// # Arguments
    ///
    /// * `listener` - Callback receiving the [`StoreEvent`] describing the change
    ///
    /// # Returns
    ///
    /// A [`Subscription`] whose `unsubscribe()` removes the listener again.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .add(Arc::new(listener));

        Subscription {
            id,
            listeners: Arc::downgrade(&self.inner.listeners),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    // endregion: --- State & Subscriptions

    // region: --- Users

    /// Set the active session user.
    ///
    /// A `Some` user is upserted into the user directory and marked online.
    pub fn set_current_user(&self, user: Option<User>) {
        let user_id = {
            let mut state = self.state();
            match user {
                Some(user) => {
                    let id = user.id.clone();
                    if !state.online_users.contains(&id) {
                        state.online_users.push(id.clone());
                    }
                    state.users.insert(id.clone(), user);
                    state.current_user_id = Some(id.clone());
                    Some(id)
                }
                None => {
                    state.current_user_id = None;
                    None
                }
            }
        };

        debug!("[STORE] current user set to {:?}", user_id);
        self.notify(StoreEvent::CurrentUserChanged { user_id });
    }

    pub fn current_user(&self) -> Option<User> {
        let state = self.state();
        state
            .current_user_id
            .as_ref()
            .and_then(|id| state.users.get(id).cloned())
    }

    pub fn get_user(&self, user_id: &str) -> Option<User> {
        self.state().users.get(user_id).cloned()
    }

    pub fn users(&self) -> Vec<User> {
        self.state().users.values().cloned().collect()
    }

    /// Find a registered user by email or username, case-insensitively.
    ///
    /// Email is tried first when both are given.
    pub fn find_user_by_login(&self, email: Option<&str>, username: Option<&str>) -> Option<User> {
        let state = self.state();

        let by_email = email.and_then(|email| {
            state
                .users
                .values()
                .find(|u| u.email.eq_ignore_ascii_case(email))
        });

        by_email
            .or_else(|| {
                username.and_then(|name| {
                    state
                        .users
                        .values()
                        .find(|u| u.username.eq_ignore_ascii_case(name))
                })
            })
            .cloned()
    }

    /// Whether `username` is taken by a user other than `except_id`.
    pub fn username_taken(&self, username: &str, except_id: Option<&str>) -> bool {
        self.state().users.values().any(|u| {
            u.username.eq_ignore_ascii_case(username) && Some(u.id.as_str()) != except_id
        })
    }

    pub fn email_taken(&self, email: &str) -> bool {
        self.state()
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// Merge `patch` into an existing user.
    ///
    /// # Returns
    ///
    /// * `Some(User)` - The updated user
    /// * `None` - No such user; nothing changed and nobody was notified
    pub fn update_user(&self, user_id: &str, patch: UserPatch) -> Option<User> {
        let updated = {
            let mut state = self.state();
            let user = state.users.get_mut(user_id)?;
            patch.apply(user);
            user.clone()
        };

        self.notify(StoreEvent::UserUpdated {
            user_id: user_id.to_string(),
        });
        Some(updated)
    }

    pub fn online_users(&self) -> Vec<String> {
        self.state().online_users.clone()
    }

    /// Drop a user from the online list. Returns whether it was present.
    pub fn remove_online_user(&self, user_id: &str) -> bool {
        let removed = {
            let mut state = self.state();
            let before = state.online_users.len();
            state.online_users.retain(|id| id != user_id);
            before != state.online_users.len()
        };

        if removed {
            self.notify(StoreEvent::OnlineUsersChanged);
        }
        removed
    }

    // endregion: --- Users

    // region: --- Rooms

    pub fn get_rooms(&self) -> Vec<Room> {
        self.state().rooms.clone()
    }

    pub fn get_room(&self, room_id: &str) -> Option<Room> {
        self.state().rooms.iter().find(|r| r.id == room_id).cloned()
    }

    /// Select the current room. Unknown ids are ignored and return `false`.
    pub fn set_current_room(&self, room_id: &str) -> bool {
        {
            let mut state = self.state();
            if !state.rooms.iter().any(|r| r.id == room_id) {
                return false;
            }
            state.current_room_id = Some(room_id.to_string());
        }

        self.notify(StoreEvent::CurrentRoomChanged {
            room_id: room_id.to_string(),
        });
        true
    }

    pub fn current_room(&self) -> Option<Room> {
        let state = self.state();
        state
            .current_room_id
            .as_ref()
            .and_then(|id| state.rooms.iter().find(|r| &r.id == id).cloned())
    }

    /// Append a room and give it an empty message list.
    pub fn add_room(&self, room: Room) {
        let room_id = room.id.clone();
        {
            let mut state = self.state();
            state.messages.insert(room_id.clone(), Vec::new());
            state.rooms.push(room);
        }

        debug!("[STORE] room added: {}", room_id);
        self.notify(StoreEvent::RoomAdded { room_id });
    }

    pub fn update_room(&self, room_id: &str, patch: RoomPatch) -> Option<Room> {
        let updated = {
            let mut state = self.state();
            let room = state.room_mut(room_id)?;
            patch.apply(room);
            room.clone()
        };

        self.notify(StoreEvent::RoomUpdated {
            room_id: room_id.to_string(),
        });
        Some(updated)
    }

    /// Add `user_id` to the room's members. Returns whether membership changed.
    pub fn add_member(&self, room_id: &str, user_id: &str) -> bool {
        let changed = {
            let mut state = self.state();
            match state.room_mut(room_id) {
                Some(room) if !room.is_member(user_id) => {
                    room.members.push(user_id.to_string());
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.notify(StoreEvent::RoomUpdated {
                room_id: room_id.to_string(),
            });
        }
        changed
    }

    /// Remove `user_id` from the room's members. Returns whether membership changed.
    pub fn remove_member(&self, room_id: &str, user_id: &str) -> bool {
        let changed = {
            let mut state = self.state();
            match state.room_mut(room_id) {
                Some(room) if room.is_member(user_id) => {
                    room.members.retain(|m| m != user_id);
                    true
                }
                _ => false,
            }
        };

        if changed {
            self.notify(StoreEvent::RoomUpdated {
                room_id: room_id.to_string(),
            });
        }
        changed
    }

    // endregion: --- Rooms

    // region: --- Messages

    /// Messages of a room in append order; empty for unknown rooms.
    pub fn get_messages(&self, room_id: &str) -> Vec<Message> {
        self.state()
            .messages
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_message(&self, room_id: &str, message_id: &str) -> Option<Message> {
        self.state()
            .messages
            .get(room_id)?
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
    }

    /// Append a message to its room and bump the room's `last_activity`.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] if `message.room_id` names no room. Nothing is stored.
    pub fn add_message(&self, message: Message) -> Result<Message> {
        let (room_id, message_id) = (message.room_id.clone(), message.id.clone());
        {
            let mut state = self.state();
            let room = state
                .room_mut(&room_id)
                .ok_or_else(|| AppError::NotFound(format!("Room {} not found", room_id)))?;
            room.last_activity = message.timestamp;

            state
                .messages
                .entry(room_id.clone())
                .or_default()
                .push(message.clone());
        }

        self.notify(StoreEvent::MessageAdded { room_id, message_id });
        Ok(message)
    }

    /// Merge `patch` into the first message with `message_id` in the room.
    ///
    /// Returns `None` without notifying when no message matched.
    pub fn update_message(&self, message_id: &str, room_id: &str, patch: MessagePatch) -> Option<Message> {
        let updated = {
            let mut state = self.state();
            let message = state
                .messages
                .get_mut(room_id)?
                .iter_mut()
                .find(|m| m.id == message_id)?;
            patch.apply(message);
            message.clone()
        };

        self.notify(StoreEvent::MessageUpdated {
            room_id: room_id.to_string(),
            message_id: message_id.to_string(),
        });
        Some(updated)
    }

    /// Store a generated reply as an `ai-response` message from the AI bot.
    pub fn add_ai_response(&self, room_id: &str, response: AiResponse) -> Result<Message> {
        let avatar = self.get_user(AI_BOT_ID).and_then(|u| u.avatar);

        let message = Message {
            id: response.id,
            content: response.content,
            user_id: AI_BOT_ID.to_string(),
            username: AI_BOT_NAME.to_string(),
            user_avatar: avatar,
            room_id: room_id.to_string(),
            timestamp: response.timestamp,
            message_type: MessageType::AiResponse,
            ai_analysis: Some(MessageAnalysis {
                sentiment: Sentiment::Neutral,
                confidence: response.confidence,
                toxicity: 0.01,
                topics: vec!["AI".to_string(), "assistance".to_string()],
                language: "en".to_string(),
                model_used: response.model,
                processed_at: response.timestamp,
            }),
            reply_to: None,
            edited: false,
            edited_at: None,
        };

        self.add_message(message)
    }

    /// Case-insensitive substring search over content and username.
    ///
    /// Without `room_id` all rooms are searched in directory order.
    pub fn search_messages(&self, query: &str, room_id: Option<&str>) -> Vec<Message> {
        let needle = query.to_lowercase();
        let matches = |m: &&Message| {
            m.content.to_lowercase().contains(&needle) || m.username.to_lowercase().contains(&needle)
        };

        let state = self.state();
        match room_id {
            Some(room_id) => state
                .messages
                .get(room_id)
                .map(|list| list.iter().filter(matches).cloned().collect())
                .unwrap_or_default(),
            None => state
                .rooms
                .iter()
                .filter_map(|room| state.messages.get(&room.id))
                .flat_map(|list| list.iter().filter(matches).cloned())
                .collect(),
        }
    }

    pub fn get_message_stats(&self, room_id: &str) -> MessageStats {
        let state = self.state();
        let messages = state.messages.get(room_id).map(Vec::as_slice).unwrap_or(&[]);
        MessageStats::from_messages(messages)
    }

    // endregion: --- Messages

    // region: --- Typing

    /// Show a typing indicator and (re)start its expiry timer.
    ///
    /// Any previous indicator for the same (user, room) is replaced, and its
    /// pending timer is cancelled.
    pub fn add_typing_user(&self, typing: TypingUser) {
        let key: TypingKey = (typing.user_id.clone(), typing.room_id.clone());
        let room_id = typing.room_id.clone();
        {
            let mut state = self.state();
            state.remove_typing(&key.0, &key.1);
            state.typing_users.push(typing);
            state.cancel_typing_timer(&key);

            state.timer_generation += 1;
            let generation = state.timer_generation;
            if let Some(handle) = self.spawn_typing_expiry(key.clone(), generation) {
                state
                    .typing_timers
                    .insert(key, TypingTimer { generation, handle });
            }
        }

        self.notify(StoreEvent::TypingChanged { room_id });
    }

    /// Remove the indicator for (user, room) and cancel its timer.
    ///
    /// Subscribers are notified even if no indicator existed.
    pub fn remove_typing_user(&self, user_id: &str, room_id: &str) {
        {
            let mut state = self.state();
            state.remove_typing(user_id, room_id);
            state.cancel_typing_timer(&(user_id.to_string(), room_id.to_string()));
        }

        self.notify(StoreEvent::TypingChanged {
            room_id: room_id.to_string(),
        });
    }

    pub fn get_typing_users(&self, room_id: &str) -> Vec<TypingUser> {
        self.state()
            .typing_users
            .iter()
            .filter(|t| t.room_id == room_id)
            .cloned()
            .collect()
    }

    fn spawn_typing_expiry(&self, key: TypingKey, generation: u64) -> Option<JoinHandle<()>> {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("[STORE] no tokio runtime, typing indicator for {:?} will not expire", key);
                return None;
            }
        };

        let ttl = self.inner.config.typing_ttl;
        let store: Weak<Inner> = Arc::downgrade(&self.inner);

        Some(runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = store.upgrade() {
                ChatStore { inner }.expire_typing(key, generation);
            }
        }))
    }

    fn expire_typing(&self, key: TypingKey, generation: u64) {
        {
            let mut state = self.state();
            // A newer event for the key replaced this timer
            match state.typing_timers.get(&key) {
                Some(timer) if timer.generation == generation => {}
                _ => return,
            }
            state.typing_timers.remove(&key);
            state.remove_typing(&key.0, &key.1);
        }

        debug!("[STORE] typing indicator expired: {:?}", key);
        self.notify(StoreEvent::TypingChanged { room_id: key.1 });
    }

    // endregion: --- Typing
}

impl std::fmt::Debug for ChatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ChatStore")
            .field("rooms", &state.rooms.len())
            .field("users", &state.users.len())
            .field("typing_users", &state.typing_users.len())
            .finish()
    }
}
