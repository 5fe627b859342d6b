//! Credential type with expiry tracking

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A secret token plus optional auxiliary data.
///
/// Always scoped to exactly one (owner, credential type) pair by whichever
/// storage holds it; the interceptor only reads and writes it through the
/// credential storage port.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The secret token.
    pub token: String,
    /// When the token expires, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Auxiliary key-value data (refresh tokens, token type, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl Credential {
    /// Creates a credential without expiry or auxiliary data.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_at: None,
            extras: BTreeMap::new(),
        }
    }

    /// Sets the expiry timestamp.
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Adds an auxiliary value.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// Looks up an auxiliary value.
    #[must_use]
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    /// Returns true if the credential expires at or before `now + leeway_secs`.
    ///
    /// Credentials without an expiry never expire. A deadline beyond the
    /// representable range counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway_secs: i64) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };
        TimeDelta::try_seconds(leeway_secs)
            .and_then(|leeway| now.checked_add_signed(leeway))
            .is_none_or(|deadline| deadline >= expires_at)
    }

    /// Short, log-safe preview of the token.
    #[must_use]
    pub fn preview(&self) -> String {
        token_preview(&self.token)
    }
}

// Keeps secrets out of logs and panic messages.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.preview())
            .field("expires_at", &self.expires_at)
            .field("extras", &self.extras.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Get a preview of a token (first 8 chars + ...).
#[must_use]
pub fn token_preview(token: &str) -> String {
    if token.chars().count() > 12 {
        let head: String = token.chars().take(8).collect();
        format!("{head}...")
    } else {
        token.to_string()
    }
}
