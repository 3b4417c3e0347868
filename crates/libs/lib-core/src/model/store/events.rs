//! # Store Events
//!
//! Change notifications emitted by [`ChatStore`](super::ChatStore) after every
//! mutation, and the subscription handle returned to listeners.

use std::sync::{Arc, Mutex, PoisonError, Weak};

/// What changed in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CurrentUserChanged { user_id: Option<String> },
    UserUpdated { user_id: String },
    OnlineUsersChanged,
    CurrentRoomChanged { room_id: String },
    RoomAdded { room_id: String },
    RoomUpdated { room_id: String },
    MessageAdded { room_id: String, message_id: String },
    MessageUpdated { room_id: String, message_id: String },
    TypingChanged { room_id: String },
}

pub(super) type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Registered listeners in registration order.
#[derive(Default)]
pub(super) struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

impl Listeners {
    pub(super) fn add(&mut self, listener: Listener) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(super) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        before != self.entries.len()
    }

    pub(super) fn snapshot(&self) -> Vec<Listener> {
        self.entries.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Handle returned by [`ChatStore::subscribe`](super::ChatStore::subscribe).
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    pub(super) id: u64,
    pub(super) listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already gone or the
    /// store no longer exists.
    pub fn unsubscribe(self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(self.id),
            None => false,
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
