//! File-based session storage implementation.
//!
//! Layout of the sessions document:
//! ```text
//! {
//!   "<internal id>": {
//!     "<platform>": { "sessionId": "...", "extractedAt": "...", ... }
//!   }
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;

use crate::session::{PlatformSessionMap, SessionRecord, StoredSessions};
use crate::store::error::{StorageError, StorageResult};
use crate::store::session::SessionStore;

/// File-based implementation of `SessionStore`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a new file session store.
    ///
    /// The file does not need to exist yet; a missing file reads as an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the sessions document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the whole sessions document.
    ///
    /// Writes to a sibling temp file and renames it over the target so readers
    /// never observe a partial document. Callers sharing a resolver must
    /// invalidate it afterwards.
    pub async fn save_all(&self, sessions: &StoredSessions) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::file_io(parent, e))?;
        }

        let content = serde_json::to_vec_pretty(sessions)
            .map_err(|e| StorageError::serialization(e.to_string()))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &content)
            .await
            .map_err(|e| StorageError::file_io(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StorageError::file_io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), ids = sessions.len(), "saved sessions file");
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load_all_sessions(&self) -> StorageResult<StoredSessions> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSessions::new());
            }
            Err(e) => return Err(StorageError::file_io(&self.path, e)),
        };

        if contents.trim().is_empty() {
            return Ok(StoredSessions::new());
        }

        let document: Map<String, Value> = serde_json::from_str(&contents)
            .map_err(|e| StorageError::file_deserialization(&self.path, e.to_string()))?;

        Ok(decode_sessions(&self.path, document))
    }
}

/// Decode the document record by record.
///
/// An entry that does not have the expected shape is dropped with a warning;
/// it never hides the rest of the store.
fn decode_sessions(path: &Path, document: Map<String, Value>) -> StoredSessions {
    let mut sessions = StoredSessions::new();

    for (internal_id, platforms) in document {
        let Value::Object(platforms) = platforms else {
            tracing::warn!(
                path = %path.display(),
                internal_id = %internal_id,
                "Skipping session entry that is not an object"
            );
            continue;
        };

        let mut decoded = PlatformSessionMap::new();
        for (platform, record) in platforms {
            match serde_json::from_value::<SessionRecord>(record) {
                Ok(record) => {
                    decoded.insert(platform, record);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        internal_id = %internal_id,
                        platform = %platform,
                        error = %e,
                        "Skipping malformed session record"
                    );
                }
            }
        }
        sessions.insert(internal_id, decoded);
    }

    sessions
}
