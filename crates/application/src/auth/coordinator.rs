//! Single-flight gate for credential resolution and refresh.
//!
//! Every authenticated request resolves its credential inside one critical
//! section guarded by a fair async mutex, so at most one refresh is in
//! flight at a time. Requests that pile up behind a failing refresh form a
//! *wave*: the failure is stored once and handed to every member of the
//! wave instead of each of them re-running the refresh. The stored error is
//! cleared when the last member of the wave leaves.
//!
//! The gate is shared by all credential types. This keeps the exactly-once
//! guarantee trivial to reason about at the cost of serializing unrelated
//! credential lookups.

use std::future::Future;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tracing::{debug, trace, warn};

use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
struct WaveState {
    /// Requests that entered the gate since the error was last cleared.
    waiters: usize,
    /// Most recent failure raised inside the critical section.
    error: Option<AuthError>,
}

/// Coordinates credential refreshes across concurrent requests.
///
/// Construct one per credential domain and share it (via `Arc`) between
/// every interceptor that must not refresh concurrently.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    gate: AsyncMutex<()>,
    // Never held across an await.
    wave: Mutex<WaveState>,
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `critical` under the gate.
    ///
    /// If the gate is free the caller runs immediately. Otherwise it waits;
    /// once admitted, if the request ahead of it failed, that same error is
    /// returned without running `critical`. A failure of `critical` is
    /// recorded for the requests still waiting.
    ///
    /// Dropping the returned future at any point releases the caller's
    /// place in the wave.
    ///
    /// # Errors
    ///
    /// Returns the error of `critical`, or the error shared by the wave.
    pub async fn run<T, F, Fut>(&self, critical: F) -> AuthResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AuthResult<T>>,
    {
        let _permit = match self.gate.try_lock() {
            Ok(guard) => {
                trace!("refresh gate acquired immediately");
                WavePermit::enter(self).holding(guard)
            }
            Err(_) => {
                let permit = WavePermit::enter(self);
                debug!("refresh gate busy, waiting");
                let permit = permit.holding(self.gate.lock().await);
                if let Some(error) = self.shared_error() {
                    warn!(%error, "propagating failure from the refresh ahead in the queue");
                    return Err(error);
                }
                permit
            }
        };

        let result = critical().await;
        if let Err(error) = &result {
            self.wave.lock().error = Some(error.clone());
        }
        result
    }

    /// Number of requests currently inside or queued at the gate.
    #[must_use]
    pub fn waiters(&self) -> usize {
        self.wave.lock().waiters
    }

    /// The failure currently shared with queued requests, if any.
    #[must_use]
    pub fn shared_error(&self) -> Option<AuthError> {
        self.wave.lock().error.clone()
    }
}

/// A request's membership in the current wave.
///
/// Leaving (on drop) decrements the waiter count, clears the shared error
/// once nobody is left, and releases the gate last.
struct WavePermit<'a> {
    coordinator: &'a RefreshCoordinator,
    guard: Option<AsyncMutexGuard<'a, ()>>,
}

impl<'a> WavePermit<'a> {
    fn enter(coordinator: &'a RefreshCoordinator) -> Self {
        coordinator.wave.lock().waiters += 1;
        Self {
            coordinator,
            guard: None,
        }
    }

    fn holding(mut self, guard: AsyncMutexGuard<'a, ()>) -> Self {
        self.guard = Some(guard);
        self
    }
}

impl Drop for WavePermit<'_> {
    fn drop(&mut self) {
        {
            let mut wave = self.coordinator.wave.lock();
            wave.waiters = wave.waiters.saturating_sub(1);
            if wave.waiters == 0 && wave.error.take().is_some() {
                trace!("wave drained, shared error cleared");
            }
        }
        drop(self.guard.take());
    }
}
