//! Candidate extraction for one platform.

use chrono::{DateTime, Utc};

use super::record::{SessionRecord, StoredSessions, UserCredentials};

/// A usable record borrowed from a snapshot, ready for ranking.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub internal_id: &'a str,
    pub record: &'a SessionRecord,
    pub extracted_at: DateTime<Utc>,
}

/// Collect the valid records for `platform`, in snapshot order.
///
/// Records without a non-empty session id are skipped. When `credentials` is
/// given, only records whose owner fields both match exactly are kept.
pub fn extract_candidates<'a>(
    snapshot: &'a StoredSessions,
    platform: &str,
    credentials: Option<&UserCredentials>,
) -> Vec<Candidate<'a>> {
    snapshot
        .iter()
        .filter_map(|(internal_id, platforms)| {
            let record = platforms.get(platform)?;
            if !record.is_valid() {
                return None;
            }
            if let Some(credentials) = credentials
                && !record.is_owned_by(credentials)
            {
                return None;
            }
            Some(Candidate {
                internal_id,
                record,
                extracted_at: record.extracted_at_or_default(),
            })
        })
        .collect()
}
