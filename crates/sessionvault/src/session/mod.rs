//! Session resolution for captured platform logins.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────────────┐   get_*/has_*   ┌─────────────────┐
//!  │ SessionResolver  │────────────────▶│  SnapshotCache  │  TTL + single-flight
//!  │ (public façade)  │                 └────────┬────────┘
//!  └────────┬─────────┘                          │ load_all_sessions
//!           │ pure functions of the snapshot     ▼
//!           ▼                           ┌─────────────────┐
//!  extract::extract_candidates          │  SessionStore   │  (file, memory, ...)
//!  select::{latest, all, discover_cookie_field}
//! ```
//!
//! - **SnapshotCache**: owns the only shared mutable state: the cached
//!   snapshot and the in-flight load handle.
//! - **extract**: filters one platform's records down to valid, optionally
//!   user-scoped candidates.
//! - **select**: ranks candidates by capture time and finds cookie fields.
//! - **SessionResolver**: composes the above; fails soft.

mod extract;
mod record;
mod resolver;
mod select;
mod snapshot_cache;

pub use extract::{Candidate, extract_candidates};
pub use record::{
    CookieField, DEFAULT_EXTRACTED_AT, MARKETINOUT, PlatformCookieInfo, PlatformSessionMap,
    SessionInfo, SessionRecord, StoredSessions, TRADINGVIEW, UserCredentials,
};
pub use resolver::{Resolution, SessionResolver, SessionStats};
pub use select::{discover_cookie_field, rank};
pub use snapshot_cache::{CacheStatus, DEFAULT_TTL, LoadOutcome, SnapshotCache};
