//! In-process session store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::session::{SessionRecord, StoredSessions};
use crate::store::error::StorageResult;
use crate::store::session::SessionStore;

/// `SessionStore` kept entirely in memory.
///
/// Cloning shares the underlying map. Every read returns a full copy, matching
/// the materialized-snapshot contract of the trait.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<StoredSessions>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with `sessions`.
    pub fn with_sessions(sessions: StoredSessions) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(sessions)),
        }
    }

    /// Store `record` for `platform` under `internal_id`, replacing any previous one.
    pub async fn put_session(&self, internal_id: &str, platform: &str, record: SessionRecord) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(internal_id.to_string())
            .or_default()
            .insert(platform.to_string(), record);
    }

    /// Remove the record for `platform` under `internal_id`.
    ///
    /// Drops the internal id entirely once its last platform is gone.
    /// Returns true if a record was removed.
    pub async fn remove_session(&self, internal_id: &str, platform: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(platforms) = sessions.get_mut(internal_id) else {
            return false;
        };
        let removed = platforms.remove(platform).is_some();
        if platforms.is_empty() {
            sessions.remove(internal_id);
        }
        removed
    }

    /// Replace the whole universe.
    pub async fn replace_all(&self, sessions: StoredSessions) {
        *self.sessions.write().await = sessions;
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load_all_sessions(&self) -> StorageResult<StoredSessions> {
        Ok(self.sessions.read().await.clone())
    }
}
