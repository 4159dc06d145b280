/*!
 * Synchronized Lazy Cell
 *
 * The whole of `get` runs under one process-wide mutex. Simple and obviously
 * correct; every call pays an uncontended lock/unlock even after the
 * instance exists.
 */

use super::construct::{build_catching, Outcome};
use crate::core::errors::{SingletonError, SingletonResult};
use crate::core::sync::{key_of, InFlight, InitStrategy, Phase};
use crate::monitoring::{InitCounters, InitStats};
use parking_lot::Mutex;
use std::panic;
use std::sync::OnceLock;
use tracing::warn;

/// Lazily constructed singleton guarded by a mutex held for the entire call
///
/// # Examples
///
/// ```
/// use process_singleton::SynchronizedCell;
///
/// static GREETING: SynchronizedCell<String> =
///     SynchronizedCell::new("greeting", || Ok("hello".to_string()));
///
/// let a = GREETING.get().unwrap();
/// let b = GREETING.get().unwrap();
/// assert!(std::ptr::eq(a, b));
/// ```
pub struct SynchronizedCell<T, F = fn() -> anyhow::Result<T>> {
    name: &'static str,
    phase: Mutex<Phase>,
    // Written once, under `phase`
    value: OnceLock<T>,
    init: F,
    counters: InitCounters,
}

impl<T, F> SynchronizedCell<T, F> {
    pub const fn new(name: &'static str, init: F) -> Self {
        Self {
            name,
            phase: parking_lot::const_mutex(Phase::Uninit),
            value: OnceLock::new(),
            init,
            counters: InitCounters::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub const fn strategy(&self) -> InitStrategy {
        InitStrategy::SynchronizedLazy
    }

    /// Non-blocking check; does not take the mutex
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    pub fn stats(&self) -> InitStats {
        self.counters.snapshot()
    }
}

impl<T, F> SynchronizedCell<T, F>
where
    F: Fn() -> anyhow::Result<T>,
{
    /// Return the instance, constructing it on the first call
    ///
    /// Blocks while another thread holds the mutex.
    pub fn get(&self) -> SingletonResult<&T> {
        let key = key_of(self);
        // The mutex is not reentrant; check before locking
        if InFlight::is_active(key) {
            warn!(singleton = self.name, "reentrant singleton initialization");
            return Err(SingletonError::reentrant(self.name));
        }

        let mut phase = self.phase.lock();

        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        if let Phase::Failed(reason) = &*phase {
            return Err(SingletonError::already_failed(self.name, reason.as_str()));
        }
        // Ready implies a stored value; Constructing implies the lock is held
        // by this thread, which InFlight already rejected.
        let began = phase.begin();
        debug_assert!(began, "synchronized cell observed {:?} under its lock", *phase);

        let _in_flight = InFlight::enter(key);
        match build_catching(self.name, self.strategy(), &self.counters, &self.init) {
            Outcome::Built(value) => {
                let value = self.value.get_or_init(|| value);
                phase.finish(Ok(()));
                Ok(value)
            }
            Outcome::Failed(reason) => {
                phase.finish(Err(reason.clone()));
                Err(SingletonError::initialization_failed(self.name, reason))
            }
            Outcome::Panicked { reason, payload } => {
                phase.finish(Err(reason));
                drop(phase);
                panic::resume_unwind(payload)
            }
        }
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for SynchronizedCell<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynchronizedCell")
            .field("name", &self.name)
            .field("value", &self.value.get())
            .finish()
    }
}
