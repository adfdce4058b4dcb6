//! Session storage trait.
//!
//! Defines the read interface the resolver needs from the backing store.

use async_trait::async_trait;

use crate::session::StoredSessions;

use super::error::StorageResult;

/// Storage interface for captured platform sessions.
///
/// The resolver only ever issues one bulk read per reload; writers live
/// outside this crate and must call [`SessionResolver::invalidate`] after
/// mutating the store.
///
/// [`SessionResolver::invalidate`]: crate::session::SessionResolver::invalidate
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load every stored session.
    ///
    /// Returns the full `internal id → platform → record` universe as one
    /// materialized snapshot. An empty store is `Ok` with an empty map.
    async fn load_all_sessions(&self) -> StorageResult<StoredSessions>;
}
