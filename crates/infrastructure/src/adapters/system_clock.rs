//! System clock adapter

use authgate_application::ports::Clock;
use chrono::{DateTime, Utc};

/// Wall-clock time, used for credential expiry checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
