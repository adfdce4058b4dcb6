//! Public session resolution API.
//!
//! Every `get_*` / `has_*` method fails soft: a store outage reads as "no
//! sessions". Callers that need to tell the two apart use the `resolve_*`
//! methods, which return a [`Resolution`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::store::{SessionStore, StorageError};

use super::extract::extract_candidates;
use super::record::{
    MARKETINOUT, PlatformCookieInfo, SessionInfo, StoredSessions, TRADINGVIEW, UserCredentials,
};
use super::select;
use super::snapshot_cache::{CacheStatus, SnapshotCache};

// ============================================================================
// Resolution
// ============================================================================

/// Outcome of a session query that keeps store failures visible.
#[derive(Debug, Clone)]
pub enum Resolution<T> {
    /// A usable session (or non-empty set of sessions) was found.
    Found(T),
    /// The store was read and nothing usable matched.
    Empty,
    /// The store could not be read.
    StoreError(Arc<StorageError>),
}

impl<T> Resolution<T> {
    /// Collapse to the fail-soft form: store errors read as nothing found.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Empty | Self::StoreError(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreError(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Found(value) => Resolution::Found(f(value)),
            Self::Empty => Resolution::Empty,
            Self::StoreError(e) => Resolution::StoreError(e),
        }
    }
}

impl<T> From<Option<T>> for Resolution<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Self::Found)
    }
}

// ============================================================================
// SessionStats
// ============================================================================

/// Counts across the whole snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    /// Number of internal session ids.
    pub total_sessions: usize,
    /// Stored records per platform, summed across internal ids.
    pub platforms: BTreeMap<String, usize>,
    /// Number of distinct `userEmail` values.
    pub users: usize,
}

impl SessionStats {
    fn from_snapshot(snapshot: &StoredSessions) -> Self {
        let mut platforms = BTreeMap::new();
        for platform in snapshot.values().flat_map(|p| p.keys()) {
            *platforms.entry(platform.clone()).or_insert(0) += 1;
        }
        Self {
            total_sessions: snapshot.len(),
            platforms,
            users: distinct_users(snapshot).len(),
        }
    }
}

fn distinct_users(snapshot: &StoredSessions) -> BTreeSet<&str> {
    snapshot
        .values()
        .flat_map(|platforms| platforms.values())
        .filter_map(|record| record.user_email.as_deref())
        .filter(|email| !email.is_empty())
        .collect()
}

// ============================================================================
// SessionResolver
// ============================================================================

/// Resolves which stored session to use for a platform.
///
/// Cheap to clone; clones share one cache and one in-flight load.
#[derive(Clone)]
pub struct SessionResolver {
    cache: Arc<SnapshotCache>,
}

impl SessionResolver {
    /// Create a resolver with the default snapshot TTL.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::from_cache(SnapshotCache::new(store))
    }

    /// Create a resolver with a custom snapshot TTL.
    pub fn with_ttl(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self::from_cache(SnapshotCache::with_ttl(store, ttl))
    }

    pub fn from_cache(cache: SnapshotCache) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    // ------------------------------------------------------------------------
    // Cache Control
    // ------------------------------------------------------------------------

    /// Drop the cached snapshot.
    ///
    /// Anything that writes to the backing store must call this afterwards.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    /// Invalidate and reload immediately.
    pub async fn refresh(&self) -> Arc<StoredSessions> {
        self.cache.invalidate();
        self.cache.get_snapshot().await
    }

    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status()
    }

    // ------------------------------------------------------------------------
    // Error-Visible Queries
    // ------------------------------------------------------------------------

    /// Most recent valid session for `platform`, optionally scoped to a user.
    pub async fn resolve_latest(
        &self,
        platform: &str,
        credentials: Option<&UserCredentials>,
    ) -> Resolution<SessionInfo> {
        match self.cache.try_get_snapshot().await {
            Ok(snapshot) => {
                select::latest(extract_candidates(&snapshot, platform, credentials)).into()
            }
            Err(e) => Resolution::StoreError(e),
        }
    }

    /// Every valid session for `platform`, most recent first.
    pub async fn resolve_all(
        &self,
        platform: &str,
        credentials: Option<&UserCredentials>,
    ) -> Resolution<Vec<SessionInfo>> {
        match self.cache.try_get_snapshot().await {
            Ok(snapshot) => {
                let sessions = select::all(extract_candidates(&snapshot, platform, credentials));
                if sessions.is_empty() {
                    Resolution::Empty
                } else {
                    Resolution::Found(sessions)
                }
            }
            Err(e) => Resolution::StoreError(e),
        }
    }

    // ------------------------------------------------------------------------
    // Fail-Soft Queries
    // ------------------------------------------------------------------------

    pub async fn get_latest_session(&self, platform: &str) -> Option<SessionInfo> {
        self.resolve_latest(platform, None).await.into_option()
    }

    pub async fn get_latest_session_for_user(
        &self,
        platform: &str,
        credentials: &UserCredentials,
    ) -> Option<SessionInfo> {
        self.resolve_latest(platform, Some(credentials))
            .await
            .into_option()
    }

    pub async fn get_all_sessions(&self, platform: &str) -> Vec<SessionInfo> {
        self.resolve_all(platform, None)
            .await
            .into_option()
            .unwrap_or_default()
    }

    pub async fn get_sessions_for_user(
        &self,
        platform: &str,
        credentials: &UserCredentials,
    ) -> Vec<SessionInfo> {
        self.resolve_all(platform, Some(credentials))
            .await
            .into_option()
            .unwrap_or_default()
    }

    pub async fn has_sessions_for_platform(&self, platform: &str) -> bool {
        let snapshot = self.cache.get_snapshot().await;
        !extract_candidates(&snapshot, platform, None).is_empty()
    }

    pub async fn has_sessions_for_platform_and_user(
        &self,
        platform: &str,
        credentials: &UserCredentials,
    ) -> bool {
        let snapshot = self.cache.get_snapshot().await;
        !extract_candidates(&snapshot, platform, Some(credentials)).is_empty()
    }

    /// Session and per-platform counts over the whole snapshot.
    pub async fn get_session_stats(&self) -> SessionStats {
        let snapshot = self.cache.get_snapshot().await;
        SessionStats::from_snapshot(&snapshot)
    }

    /// Distinct owner emails across all platforms, sorted.
    pub async fn get_available_users(&self) -> Vec<String> {
        let snapshot = self.cache.get_snapshot().await;
        distinct_users(&snapshot)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // ------------------------------------------------------------------------
    // Platform Wrappers
    // ------------------------------------------------------------------------

    /// Latest MarketInOut session together with its cookie field.
    ///
    /// Returns `None` when the latest session carries no cookie field.
    pub async fn get_marketinout_session(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Option<PlatformCookieInfo> {
        let session = self
            .resolve_latest(MARKETINOUT, credentials)
            .await
            .into_option()?;
        let Some(cookie) = select::discover_cookie_field(&session.session_data) else {
            tracing::debug!(
                internal_id = %session.internal_id,
                "MarketInOut session has no cookie field"
            );
            return None;
        };
        Some(PlatformCookieInfo { session, cookie })
    }

    /// Latest TradingView session.
    pub async fn get_tradingview_session(
        &self,
        credentials: Option<&UserCredentials>,
    ) -> Option<SessionInfo> {
        self.resolve_latest(TRADINGVIEW, credentials)
            .await
            .into_option()
    }
}
