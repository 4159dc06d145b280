/*!
 * Holder Cell
 *
 * Initialize-on-demand holder: the instance lives in a `OnceLock` that is
 * not touched until the first `get`. The std one-time-init primitive
 * supplies the guarantees (at most one initializer run, concurrent callers
 * wait for it, full visibility of the result), so the cell contains no
 * locking code of its own.
 *
 * Declared as a function-local `static` (see `singleton!`), the holder is not
 * even referenced until the function first runs.
 */

use super::construct::{build_catching, Outcome};
use crate::core::errors::{SingletonError, SingletonResult};
use crate::core::sync::{key_of, InFlight, InitStrategy};
use crate::monitoring::{InitCounters, InitStats};
use std::panic;
use std::sync::OnceLock;
use tracing::warn;

/// Lazily constructed singleton delegating one-time init to `OnceLock`
///
/// A failed construction is stored like a success, so every caller
/// re-observes the same `InitializationFailed`.
///
/// # Examples
///
/// ```
/// use process_singleton::HolderCell;
///
/// fn banner() -> &'static str {
///     static HOLDER: HolderCell<String> =
///         HolderCell::new("banner", || Ok(format!("v{}", 1)));
///     HOLDER.get().map(String::as_str).unwrap_or("unavailable")
/// }
///
/// assert_eq!(banner(), "v1");
/// assert!(std::ptr::eq(banner(), banner()));
/// ```
pub struct HolderCell<T, F = fn() -> anyhow::Result<T>> {
    name: &'static str,
    slot: OnceLock<Result<T, String>>,
    init: F,
    counters: InitCounters,
}

impl<T, F> HolderCell<T, F> {
    pub const fn new(name: &'static str, init: F) -> Self {
        Self {
            name,
            slot: OnceLock::new(),
            init,
            counters: InitCounters::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub const fn strategy(&self) -> InitStrategy {
        InitStrategy::Holder
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.slot.get(), Some(Ok(_)))
    }

    pub fn stats(&self) -> InitStats {
        self.counters.snapshot()
    }

    fn resolve<'a>(&self, slot: &'a Result<T, String>) -> SingletonResult<&'a T> {
        slot.as_ref()
            .map_err(|reason| SingletonError::initialization_failed(self.name, reason.as_str()))
    }
}

impl<T, F> HolderCell<T, F>
where
    F: Fn() -> anyhow::Result<T>,
{
    /// Return the instance, constructing it on the first call
    #[inline]
    pub fn get(&self) -> SingletonResult<&T> {
        match self.slot.get() {
            Some(slot) => self.resolve(slot),
            None => self.get_slow(),
        }
    }

    #[cold]
    fn get_slow(&self) -> SingletonResult<&T> {
        // OnceLock deadlocks on reentrant init; refuse instead
        let Some(_in_flight) = InFlight::enter(key_of(self)) else {
            warn!(singleton = self.name, "reentrant singleton initialization");
            return Err(SingletonError::reentrant(self.name));
        };

        let mut panicked = None;
        let slot = self.slot.get_or_init(|| {
            match build_catching(self.name, self.strategy(), &self.counters, &self.init) {
                Outcome::Built(value) => Ok(value),
                Outcome::Failed(reason) => Err(reason),
                Outcome::Panicked { reason, payload } => {
                    panicked = Some(payload);
                    Err(reason)
                }
            }
        });

        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        self.resolve(slot)
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for HolderCell<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolderCell")
            .field("name", &self.name)
            .field("slot", &self.slot.get())
            .finish()
    }
}
