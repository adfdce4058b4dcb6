//! Recency ranking and selection over extracted candidates.

use std::cmp::Reverse;

use super::extract::Candidate;
use super::record::{CookieField, SessionInfo, SessionRecord};

/// Sort most recent first. The sort is stable, so ties keep snapshot order.
pub fn rank(mut candidates: Vec<Candidate<'_>>) -> Vec<Candidate<'_>> {
    candidates.sort_by_key(|c| Reverse(c.extracted_at));
    candidates
}

/// The most recently captured candidate, if any.
pub fn latest(candidates: Vec<Candidate<'_>>) -> Option<SessionInfo> {
    rank(candidates).first().map(to_info)
}

/// Every candidate, most recent first.
pub fn all(candidates: Vec<Candidate<'_>>) -> Vec<SessionInfo> {
    rank(candidates).iter().map(to_info).collect()
}

/// Find the field usable as the platform cookie.
pub fn discover_cookie_field(record: &SessionRecord) -> Option<CookieField> {
    record.cookie_field()
}

fn to_info(candidate: &Candidate<'_>) -> SessionInfo {
    SessionInfo {
        session_data: candidate.record.clone(),
        internal_id: candidate.internal_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::extract::extract_candidates;
    use crate::session::record::StoredSessions;

    fn insert(sessions: &mut StoredSessions, id: &str, record: SessionRecord) {
        sessions
            .entry(id.to_string())
            .or_default()
            .insert("mio".to_string(), record);
    }

    #[test]
    fn latest_picks_max_extracted_at() {
        let mut sessions = StoredSessions::new();
        insert(
            &mut sessions,
            "u1",
            SessionRecord::new("a").with_extracted_at("2024-01-01T00:00:00Z"),
        );
        insert(
            &mut sessions,
            "u2",
            SessionRecord::new("b").with_extracted_at("2024-02-01T00:00:00Z"),
        );
        insert(&mut sessions, "u3", SessionRecord::new("c"));

        let latest = latest(extract_candidates(&sessions, "mio", None)).unwrap();
        assert_eq!(latest.internal_id, "u2");
        assert_eq!(latest.session_data.session_id.as_deref(), Some("b"));
    }

    #[test]
    fn all_is_sorted_descending_with_stable_ties() {
        let mut sessions = StoredSessions::new();
        insert(&mut sessions, "a", SessionRecord::new("1"));
        insert(
            &mut sessions,
            "b",
            SessionRecord::new("2").with_extracted_at("2024-03-01T00:00:00Z"),
        );
        insert(&mut sessions, "c", SessionRecord::new("3"));

        let ids: Vec<_> = all(extract_candidates(&sessions, "mio", None))
            .into_iter()
            .map(|info| info.internal_id)
            .collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn latest_of_nothing_is_none() {
        assert!(latest(Vec::new()).is_none());
        assert!(all(Vec::new()).is_empty());
    }

    #[test]
    fn discovery_ignores_metadata() {
        let creds = crate::session::UserCredentials::new("e", "p");
        let record = SessionRecord::new("sid")
            .with_extracted_at("2024-01-01T00:00:00Z")
            .with_owner(&creds);
        assert!(discover_cookie_field(&record).is_none());

        let record = record.with_auth_field("ASP.NET_SessionId", "cookie");
        let cookie = discover_cookie_field(&record).unwrap();
        assert_eq!(cookie.key, "ASP.NET_SessionId");
        assert_eq!(cookie.value, "cookie");
    }
}
