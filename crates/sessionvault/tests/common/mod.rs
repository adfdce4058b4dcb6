//! Common test utilities.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use sessionvault::session::{SessionRecord, StoredSessions};
use sessionvault::store::{SessionStore, StorageError, StorageResult};

/// Store that serves a fixed snapshot, counts reads, and can be gated or failed.
pub struct ScriptedStore {
    sessions: StoredSessions,
    loads: AtomicUsize,
    fail: AtomicBool,
    gate: Option<Arc<Notify>>,
}

impl ScriptedStore {
    pub fn new(sessions: StoredSessions) -> Self {
        Self {
            sessions,
            loads: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            gate: None,
        }
    }

    /// Reads block until `gate` is notified, once per read.
    pub fn gated(sessions: StoredSessions, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(sessions)
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for ScriptedStore {
    async fn load_all_sessions(&self) -> StorageResult<StoredSessions> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("connection refused"));
        }
        Ok(self.sessions.clone())
    }
}

/// Build a snapshot from `(internal id, platform, record)` triples.
pub fn snapshot(entries: Vec<(&str, &str, SessionRecord)>) -> StoredSessions {
    let mut sessions = StoredSessions::new();
    for (id, platform, record) in entries {
        sessions
            .entry(id.to_string())
            .or_default()
            .insert(platform.to_string(), record);
    }
    sessions
}
