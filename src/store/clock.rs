//! Time sources for expiration checks.
//!
//! The store reads wall-clock milliseconds through [`Clock`] so tests can
//! move time forward without sleeping.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Source of the current time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Controllable time source for deterministic testing.
///
/// Clones share the same instant, so a test can keep one handle and hand
/// another to the store.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<AtomicI64>,
}

impl ManualClock {
    /// Create a clock frozen at `initial_ms`.
    pub fn new(initial_ms: i64) -> Self {
        Self {
            current: Arc::new(AtomicI64::new(initial_ms)),
        }
    }

    /// Advance time by `by`.
    pub fn advance(&self, by: Duration) {
        let ms = i64::try_from(by.as_millis()).unwrap_or(i64::MAX);
        self.current.fetch_add(ms, Ordering::SeqCst);
    }

    /// Set absolute time.
    pub fn set(&self, ms: i64) {
        self.current.store(ms, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(SystemClock.now_ms())
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }
}
