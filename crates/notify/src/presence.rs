//! Presence registry: which live connection, if any, currently represents a
//! given user.
//!
//! The mapping holds at most one connection per user; registering again for
//! the same user displaces the previous entry (last registration wins). The
//! displaced connection stays open and keeps receiving room broadcasts, it
//! just stops being the target for user-addressed pushes.

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::hub::ConnectionId;

#[derive(Default)]
pub struct PresenceRegistry {
    entries: RwLock<HashMap<i64, ConnectionId>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user_id` to `connection_id`, displacing any prior binding.
    pub async fn register(&self, user_id: i64, connection_id: ConnectionId) {
        let mut entries = self.entries.write().await;
        entries.insert(user_id, connection_id);
    }

    /// Current connection for `user_id`. Absence means the user cannot be
    /// pushed to; callers fall back to the persisted record and email.
    pub async fn lookup(&self, user_id: i64) -> Option<ConnectionId> {
        let entries = self.entries.read().await;
        entries.get(&user_id).copied()
    }

    /// Drop whatever binding points at `connection_id`. Safe to call for
    /// connections that were never registered.
    pub async fn unregister(&self, connection_id: ConnectionId) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, bound| *bound != connection_id);
    }
}
