//! Clock port

use chrono::{DateTime, Utc};

/// Port for reading the current time.
///
/// Credential expiry checks go through this so tests can pin the time.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
