//! Interceptor settings
//!
//! Every field has a default so partial settings files stay valid.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const fn default_max_attempts() -> u32 {
    3
}

const fn default_expiry_leeway_secs() -> i64 {
    30
}

/// Largest accepted `expiry_leeway_secs` (one day).
pub const MAX_EXPIRY_LEEWAY_SECS: i64 = 86_400;

fn default_user_agent() -> String {
    format!("authgate/{}", env!("CARGO_PKG_VERSION"))
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

/// Tunables for the interceptor and its HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSettings {
    /// Hard ceiling on network attempts per request.
    ///
    /// Applies on top of the policy's refresh decision, so a policy that
    /// always asks for a refresh still terminates.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Credentials expiring within this many seconds are treated as invalid.
    #[serde(default = "default_expiry_leeway_secs")]
    pub expiry_leeway_secs: i64,

    /// User-Agent sent by the HTTP adapter.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Default request timeout used by the HTTP adapter.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl AuthSettings {
    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> DomainResult<()> {
        if self.max_attempts == 0 {
            return Err(DomainError::InvalidSetting {
                name: "max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0..=MAX_EXPIRY_LEEWAY_SECS).contains(&self.expiry_leeway_secs) {
            return Err(DomainError::InvalidSetting {
                name: "expiry_leeway_secs",
                reason: format!("must be between 0 and {MAX_EXPIRY_LEEWAY_SECS}"),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(DomainError::InvalidSetting {
                name: "request_timeout_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            expiry_leeway_secs: default_expiry_leeway_secs(),
            user_agent: default_user_agent(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}
