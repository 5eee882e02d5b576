// SPDX-License-Identifier: MIT

//! Clock abstraction for testable time handling.
//!
//! The scheduler loop, window-rule matcher, and job timeout logic all read
//! "now" through this trait instead of calling `SystemTime::now()` directly,
//! so tests can drive calendar time deterministically with [`FakeClock`].

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current time.
///
/// `epoch_ms` is the basis for all persisted timestamps and for CRON window
/// evaluation; `now` (a monotonic [`std::time::Instant`]-free wall clock
/// reading) is used for duration math where only elapsed time matters.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Milliseconds since the Unix epoch, in the daemon's local timezone
    /// reference frame (callers convert to local calendar fields as needed).
    fn epoch_ms(&self) -> u64;

    /// Current wall-clock instant as milliseconds, for elapsed-time math.
    fn monotonic_ms(&self) -> u64 {
        self.epoch_ms()
    }
}

/// Real system clock.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Fake clock for testing with controllable time.
#[derive(Clone)]
pub struct FakeClock {
    epoch_ms: Arc<Mutex<u64>>,
}

impl FakeClock {
    /// Start the fake clock at the given epoch milliseconds.
    pub fn at(epoch_ms: u64) -> Self {
        Self { epoch_ms: Arc::new(Mutex::new(epoch_ms)) }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        *self.epoch_ms.lock() += duration.as_millis() as u64;
    }

    /// Set the clock to a specific epoch milliseconds value.
    pub fn set_epoch_ms(&self, ms: u64) {
        *self.epoch_ms.lock() = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::at(0)
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> u64 {
        *self.epoch_ms.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
