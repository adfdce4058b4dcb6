//! Stored session schema.
//!
//! One [`SessionRecord`] is one captured login for one external platform.
//! Records are grouped per platform under an internal session id:
//!
//! ```text
//! StoredSessions      internal id → PlatformSessionMap
//! PlatformSessionMap  platform    → SessionRecord
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Platform name used for MarketInOut sessions.
pub const MARKETINOUT: &str = "marketinout";

/// Platform name used for TradingView sessions.
pub const TRADINGVIEW: &str = "tradingview";

/// Sort key substituted when a record has no usable `extractedAt`.
pub const DEFAULT_EXTRACTED_AT: DateTime<Utc> = DateTime::UNIX_EPOCH;

/// Platform name → record, for one internal session id.
pub type PlatformSessionMap = BTreeMap<String, SessionRecord>;

/// Internal session id → platform records. The full persisted universe.
pub type StoredSessions = BTreeMap<String, PlatformSessionMap>;

// ============================================================================
// SessionRecord
// ============================================================================

/// A captured session for one platform.
///
/// Metadata fields are named; every other stored field is a platform-specific
/// auth field and is kept in document order in `auth_fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Opaque platform session identifier. Required (non-empty) for validity.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_id: Option<String>,

    /// When the session was captured (RFC 3339).
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub extracted_at: Option<String>,

    /// URL or page the session was captured from.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub extracted_from: Option<String>,

    /// Capture mechanism (e.g. "extension").
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub source: Option<String>,

    /// Owner tag: email of the user that captured the session.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_email: Option<String>,

    /// Owner tag: password of the user that captured the session.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_password: Option<String>,

    /// Platform-specific auth fields (cookie name → value and the like).
    #[serde(flatten)]
    pub auth_fields: Map<String, Value>,
}

impl SessionRecord {
    /// Create a record holding only a session id.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    /// Set the capture timestamp.
    pub fn with_extracted_at(mut self, extracted_at: impl Into<String>) -> Self {
        self.extracted_at = Some(extracted_at.into());
        self
    }

    /// Tag the record with its owner's credentials.
    pub fn with_owner(mut self, credentials: &UserCredentials) -> Self {
        self.user_email = Some(credentials.user_email.clone());
        self.user_password = Some(credentials.user_password.clone());
        self
    }

    /// Append a platform-specific auth field.
    pub fn with_auth_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_fields
            .insert(name.into(), Value::String(value.into()));
        self
    }

    /// A record is usable iff it carries a non-empty session id.
    pub fn is_valid(&self) -> bool {
        self.session_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Exact, case-sensitive match of both owner fields.
    pub fn is_owned_by(&self, credentials: &UserCredentials) -> bool {
        self.user_email.as_deref() == Some(credentials.user_email.as_str())
            && self.user_password.as_deref() == Some(credentials.user_password.as_str())
    }

    /// Capture time used for ranking.
    ///
    /// Absent or unparsable timestamps resolve to [`DEFAULT_EXTRACTED_AT`].
    pub fn extracted_at_or_default(&self) -> DateTime<Utc> {
        self.extracted_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|at| at.with_timezone(&Utc))
            .unwrap_or(DEFAULT_EXTRACTED_AT)
    }

    /// First auth field with a non-empty string value.
    pub fn cookie_field(&self) -> Option<CookieField> {
        self.auth_fields.iter().find_map(|(key, value)| match value {
            Value::String(value) if !value.is_empty() => Some(CookieField {
                key: key.clone(),
                value: value.clone(),
            }),
            _ => None,
        })
    }
}

/// Metadata written by older capture tools is not always a string (epoch
/// millis for `extractedAt`, for instance). Such values read as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        _ => None,
    })
}

// ============================================================================
// Query & Result Types
// ============================================================================

/// Credentials used as an opaque ownership filter.
///
/// Never validated or hashed; compared by exact string equality only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    pub user_email: String,
    pub user_password: String,
}

impl UserCredentials {
    pub fn new(user_email: impl Into<String>, user_password: impl Into<String>) -> Self {
        Self {
            user_email: user_email.into(),
            user_password: user_password.into(),
        }
    }
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("user_email", &self.user_email)
            .field("user_password", &"<redacted>")
            .finish()
    }
}

/// A resolved session and the internal id it was stored under.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_data: SessionRecord,
    pub internal_id: String,
}

/// Cookie name/value pair found on a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CookieField {
    pub key: String,
    pub value: String,
}

/// A resolved session for a cookie-authenticated platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformCookieInfo {
    #[serde(flatten)]
    pub session: SessionInfo,
    pub cookie: CookieField,
}
