//! TTL cache over the backing store with single-flight reloads.
//!
//! ```text
//!   IDLE ──miss──▶ LOADING ──settle (ok | err)──▶ IDLE
//!                    ▲
//!                    └── callers arriving while LOADING join the same load
//! ```
//!
//! At most one `load_all_sessions` call is outstanding at any time. Successful
//! loads replace the cached snapshot wholesale; failures are never cached.

use std::panic::AssertUnwindSafe;
// std::sync::Mutex is fine here: the lock is never held across .await points.
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::store::{SessionStore, StorageError};

use super::record::StoredSessions;

/// Default snapshot time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15);

/// Outcome of one backing-store read, shared by every caller that joined it.
pub type LoadOutcome = Result<Arc<StoredSessions>, Arc<StorageError>>;

type LoadFuture = Shared<BoxFuture<'static, LoadOutcome>>;

// ============================================================================
// SnapshotCache
// ============================================================================

/// Cached view of the backing store.
pub struct SnapshotCache {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    snapshot: Option<CachedSnapshot>,
    inflight: Option<InflightLoad>,
    loads: u64,
    failures: u64,
}

struct CachedSnapshot {
    data: Arc<StoredSessions>,
    fetched_at: Instant,
}

struct InflightLoad {
    future: LoadFuture,
    /// Set by `invalidate`: the read started before a store write, so its
    /// result must not be cached or handed to callers that arrive later.
    invalidated: bool,
}

/// Point-in-time view of the cache for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub cached: bool,
    pub fresh: bool,
    pub age_ms: Option<u64>,
    pub ttl_ms: u64,
    pub loading: bool,
    pub loads: u64,
    pub failures: u64,
}

impl SnapshotCache {
    /// Create a cache with the default TTL.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return a fresh-enough snapshot, falling back to an empty one if the
    /// store cannot be read.
    pub async fn get_snapshot(&self) -> Arc<StoredSessions> {
        match self.try_get_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "Serving empty snapshot after failed load");
                Arc::new(StoredSessions::new())
            }
        }
    }

    /// Return a fresh-enough snapshot, surfacing store failures.
    ///
    /// Serves the cached snapshot while it is younger than the TTL. Otherwise
    /// joins the in-flight load, or starts one if none is running.
    pub async fn try_get_snapshot(&self) -> LoadOutcome {
        loop {
            let (load, invalidated) = {
                let mut state = self.lock_state();

                if let Some(cached) = &state.snapshot
                    && cached.fetched_at.elapsed() < self.ttl
                {
                    return Ok(Arc::clone(&cached.data));
                }

                match &state.inflight {
                    Some(inflight) => {
                        debug!("Joining in-flight session load");
                        (inflight.future.clone(), inflight.invalidated)
                    }
                    None => {
                        let future = Self::start_load(Arc::clone(&self.store));
                        state.inflight = Some(InflightLoad {
                            future: future.clone(),
                            invalidated: false,
                        });
                        state.loads += 1;
                        debug!(load = state.loads, "Starting session load");
                        (future, false)
                    }
                }
            };

            let outcome = load.clone().await;
            self.settle(&load, &outcome);

            // A load that predates an invalidation only drains the single
            // flight slot; go round again for data read after the write.
            if !invalidated {
                return outcome;
            }
        }
    }

    /// Drop the cached snapshot. The next read always goes to the store.
    ///
    /// A load already in flight still completes for the callers that joined
    /// it, but its result is not cached.
    pub fn invalidate(&self) {
        let mut state = self.lock_state();
        state.snapshot = None;
        if let Some(inflight) = &mut state.inflight {
            inflight.invalidated = true;
        }
        debug!("Session snapshot invalidated");
    }

    /// Diagnostics snapshot of the cache state.
    pub fn status(&self) -> CacheStatus {
        let state = self.lock_state();
        let age = state.snapshot.as_ref().map(|s| s.fetched_at.elapsed());
        CacheStatus {
            cached: state.snapshot.is_some(),
            fresh: age.is_some_and(|age| age < self.ttl),
            age_ms: age.map(duration_ms),
            ttl_ms: duration_ms(self.ttl),
            loading: state.inflight.is_some(),
            loads: state.loads,
            failures: state.failures,
        }
    }

    /// A panicking store read settles as a failed load; a poisoned `Shared`
    /// would otherwise stay in the in-flight slot forever.
    fn start_load(store: Arc<dyn SessionStore>) -> LoadFuture {
        async move {
            let outcome = AssertUnwindSafe(store.load_all_sessions())
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(StorageError::unavailable("session store read panicked"))
                });
            outcome.map(Arc::new).map_err(Arc::new)
        }
        .boxed()
        .shared()
    }

    /// Record the outcome of `load`. Only the first waiter to get here does
    /// anything; the slot is matched by identity so a newer load is left alone.
    fn settle(&self, load: &LoadFuture, outcome: &LoadOutcome) {
        let mut state = self.lock_state();
        let is_current = state
            .inflight
            .as_ref()
            .is_some_and(|inflight| inflight.future.ptr_eq(load));
        if !is_current {
            return;
        }
        let Some(inflight) = state.inflight.take() else {
            return;
        };

        match outcome {
            Ok(data) if !inflight.invalidated => {
                let platforms: usize = data.values().map(|p| p.len()).sum();
                info!(
                    ids = data.len(),
                    records = platforms,
                    "Loaded session snapshot"
                );
                state.snapshot = Some(CachedSnapshot {
                    data: Arc::clone(data),
                    fetched_at: Instant::now(),
                });
            }
            Ok(_) => {
                debug!("Discarding session load superseded by invalidation");
            }
            Err(e) => {
                state.failures += 1;
                warn!(error = %e, "Failed to load sessions from store");
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().expect("mutex poisoned")
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
