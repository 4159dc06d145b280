/*!
 * Construction Metrics
 * Lightweight per-cell counters for construction attempts and outcomes
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Snapshot of a cell's construction history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitStats {
    /// Times an initializer was invoked
    pub attempts: u32,
    /// Initializer runs that produced the instance
    pub successes: u32,
    /// Initializer runs that returned an error or panicked
    pub failures: u32,
    /// Duration of the successful construction
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub init_duration_us: Option<u64>,
}

impl InitStats {
    /// True once an instance has been produced
    #[inline]
    pub fn constructed(&self) -> bool {
        self.successes > 0
    }
}

const NO_DURATION: u64 = u64::MAX;

/// Atomic counters owned by a cell
#[derive(Debug)]
pub(crate) struct InitCounters {
    attempts: AtomicU32,
    successes: AtomicU32,
    failures: AtomicU32,
    init_micros: AtomicU64,
}

impl InitCounters {
    pub(crate) const fn new() -> Self {
        Self {
            attempts: AtomicU32::new(0),
            successes: AtomicU32::new(0),
            failures: AtomicU32::new(0),
            init_micros: AtomicU64::new(NO_DURATION),
        }
    }

    /// Start an attempt; it counts as a failure unless settled as success
    pub(crate) fn begin(&self) -> Attempt<'_> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        Attempt {
            counters: self,
            started: Instant::now(),
            settled: false,
        }
    }

    pub(crate) fn snapshot(&self) -> InitStats {
        let micros = self.init_micros.load(Ordering::Relaxed);
        InitStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            init_duration_us: (micros != NO_DURATION).then_some(micros),
        }
    }
}

/// One construction attempt in progress
///
/// Dropped unsettled (error return or unwinding) it records a failure.
pub(crate) struct Attempt<'a> {
    counters: &'a InitCounters,
    started: Instant,
    settled: bool,
}

impl Attempt<'_> {
    pub(crate) fn succeed(mut self) -> Duration {
        let elapsed = self.started.elapsed();
        self.counters.successes.fetch_add(1, Ordering::Relaxed);
        self.counters
            .init_micros
            .store(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.settled = true;
        elapsed
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}
