//! Integration tests for the file-backed store behind a resolver.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use sessionvault::session::{MARKETINOUT, SessionRecord, SessionResolver, StoredSessions};
use sessionvault::store::file::FileSessionStore;

// ============================================================================
// Helpers
// ============================================================================

fn create_store(temp_dir: &TempDir) -> FileSessionStore {
    FileSessionStore::new(temp_dir.path().join("sessions.json"))
}

fn one_session(id: &str, session_id: &str, extracted_at: &str) -> StoredSessions {
    let mut sessions = StoredSessions::new();
    sessions.entry(id.to_string()).or_default().insert(
        MARKETINOUT.to_string(),
        SessionRecord::new(session_id)
            .with_extracted_at(extracted_at)
            .with_auth_field("ASPSESSIONID", format!("cookie-{session_id}")),
    );
    sessions
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn writes_are_invisible_until_invalidate() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_store(&temp_dir);
    store
        .save_all(&one_session("u1", "first", "2024-01-01T00:00:00Z"))
        .await
        .unwrap();

    let resolver = SessionResolver::with_ttl(Arc::new(store.clone()), Duration::from_secs(3600));
    let before = resolver.get_latest_session(MARKETINOUT).await.unwrap();
    assert_eq!(before.session_data.session_id.as_deref(), Some("first"));

    store
        .save_all(&one_session("u2", "second", "2024-02-01T00:00:00Z"))
        .await
        .unwrap();

    // Still served from the cached snapshot.
    let cached = resolver.get_latest_session(MARKETINOUT).await.unwrap();
    assert_eq!(cached.internal_id, "u1");

    resolver.invalidate();
    let after = resolver.get_marketinout_session(None).await.unwrap();
    assert_eq!(after.session.internal_id, "u2");
    assert_eq!(after.cookie.value, "cookie-second");
}

#[tokio::test]
async fn missing_file_resolves_to_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let resolver = SessionResolver::new(Arc::new(create_store(&temp_dir)));

    assert!(resolver.get_latest_session(MARKETINOUT).await.is_none());
    assert_eq!(resolver.get_session_stats().await.total_sessions, 0);
    assert_eq!(resolver.cache_status().failures, 0);
}

#[tokio::test]
async fn corrupt_file_fails_soft_then_recovers() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_store(&temp_dir);
    std::fs::write(store.path(), "{ truncated").unwrap();

    let resolver = SessionResolver::new(Arc::new(store.clone()));
    assert!(resolver.get_latest_session(MARKETINOUT).await.is_none());
    assert!(
        resolver
            .resolve_latest(MARKETINOUT, None)
            .await
            .is_store_error()
    );

    store
        .save_all(&one_session("u1", "fixed", "2024-01-01T00:00:00Z"))
        .await
        .unwrap();
    let latest = resolver.get_latest_session(MARKETINOUT).await.unwrap();
    assert_eq!(latest.internal_id, "u1");
}

#[tokio::test]
async fn one_malformed_record_leaves_other_platforms_resolvable() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_store(&temp_dir);
    std::fs::write(
        store.path(),
        r#"{
            "u1": {
                "marketinout": {
                    "sessionId": "good",
                    "extractedAt": "2024-01-01T00:00:00Z",
                    "ASPSESSIONID": "cookie-good"
                }
            },
            "u2": {
                "tradingview": {"sessionId": "tv", "extractedAt": 1704067200000},
                "marketinout": 17
            }
        }"#,
    )
    .unwrap();

    let resolver = SessionResolver::new(Arc::new(store));
    assert!(
        !resolver
            .resolve_latest(MARKETINOUT, None)
            .await
            .is_store_error()
    );

    let mio = resolver.get_marketinout_session(None).await.unwrap();
    assert_eq!(mio.session.internal_id, "u1");
    assert_eq!(mio.cookie.value, "cookie-good");

    let tv = resolver.get_tradingview_session(None).await.unwrap();
    assert_eq!(tv.internal_id, "u2");
    assert_eq!(resolver.get_session_stats().await.total_sessions, 2);
}
