/*!
 * Double-Checked Locking Cell
 *
 * # Algorithm
 *
 * 1. Check 1: `Acquire` load of the instance pointer. Non-null returns
 *    immediately without touching the mutex (the steady-state path).
 * 2. Lock the mutex.
 * 3. Check 2: re-load the pointer; another thread may have published it
 *    between check 1 and acquiring the lock.
 * 4. Still null: construct, box, and publish with a `Release` store.
 * 5. Unlock and return.
 *
 * # Publication
 *
 * The `Release` store in step 4 pairs with the `Acquire` load in step 1, so a
 * thread that observes a non-null pointer also observes every write made
 * while constructing the value. The pointer goes from null to non-null once
 * and never changes afterwards.
 */

use super::construct::{build_catching, Outcome};
use crate::core::errors::{SingletonError, SingletonResult};
use crate::core::sync::{key_of, InFlight, InitStrategy, Phase};
use crate::monitoring::{InitCounters, InitStats};
use parking_lot::Mutex;
use std::marker::PhantomData;
use std::panic;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use tracing::warn;

/// Lazily constructed singleton with a lock-free fast path
///
/// # Examples
///
/// ```
/// use process_singleton::DoubleCheckedCell;
///
/// static PRIMES: DoubleCheckedCell<Vec<u32>> =
///     DoubleCheckedCell::new("primes", || Ok(vec![2, 3, 5, 7]));
///
/// assert_eq!(PRIMES.get().unwrap().len(), 4);
/// ```
pub struct DoubleCheckedCell<T, F = fn() -> anyhow::Result<T>> {
    name: &'static str,
    /// Null until published; owns a leaked `Box<T>` afterwards
    instance: AtomicPtr<T>,
    phase: Mutex<Phase>,
    init: F,
    counters: InitCounters,
    _owns: PhantomData<Box<T>>,
}

// Safety: the instance is written once under `phase` and published with
// release/acquire ordering. Shared access hands out `&T` to any thread, and
// the owning thread drops `T`, hence `T: Send + Sync`.
unsafe impl<T: Send + Sync, F: Sync> Sync for DoubleCheckedCell<T, F> {}
unsafe impl<T: Send, F: Send> Send for DoubleCheckedCell<T, F> {}

impl<T, F> DoubleCheckedCell<T, F> {
    pub const fn new(name: &'static str, init: F) -> Self {
        Self {
            name,
            instance: AtomicPtr::new(ptr::null_mut()),
            phase: parking_lot::const_mutex(Phase::Uninit),
            init,
            counters: InitCounters::new(),
            _owns: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub const fn strategy(&self) -> InitStrategy {
        InitStrategy::DoubleChecked
    }

    pub fn is_initialized(&self) -> bool {
        !self.instance.load(Ordering::Acquire).is_null()
    }

    pub fn stats(&self) -> InitStats {
        self.counters.snapshot()
    }

    /// # Safety
    ///
    /// `ptr` must be non-null and have been loaded from `self.instance`
    /// with `Acquire` ordering (or under the mutex).
    #[inline]
    unsafe fn deref_published(&self, ptr: *mut T) -> &T {
        // Published pointers are never freed or replaced while `self` lives
        &*ptr
    }
}

impl<T, F> DoubleCheckedCell<T, F>
where
    F: Fn() -> anyhow::Result<T>,
{
    /// Return the instance, constructing it on the first call
    #[inline]
    pub fn get(&self) -> SingletonResult<&T> {
        // Check 1
        let ptr = self.instance.load(Ordering::Acquire);
        if !ptr.is_null() {
            // Safety: non-null, acquire-loaded
            return Ok(unsafe { self.deref_published(ptr) });
        }
        self.get_slow()
    }

    #[cold]
    fn get_slow(&self) -> SingletonResult<&T> {
        let key = key_of(self);
        let Some(_in_flight) = InFlight::enter(key) else {
            warn!(singleton = self.name, "reentrant singleton initialization");
            return Err(SingletonError::reentrant(self.name));
        };

        let mut phase = self.phase.lock();

        // Check 2
        let ptr = self.instance.load(Ordering::Acquire);
        if !ptr.is_null() {
            // Safety: non-null, acquire-loaded
            return Ok(unsafe { self.deref_published(ptr) });
        }

        match &*phase {
            Phase::Failed(reason) => {
                return Err(SingletonError::already_failed(self.name, reason.as_str()))
            }
            Phase::Uninit => {}
            // Ready implies a published pointer; Constructing implies the
            // lock is held by this thread, which InFlight already rejected.
            Phase::Constructing | Phase::Ready => {
                return Err(SingletonError::reentrant(self.name))
            }
        }
        phase.begin();

        match build_catching(self.name, self.strategy(), &self.counters, &self.init) {
            Outcome::Built(value) => {
                let raw = Box::into_raw(Box::new(value));
                self.instance.store(raw, Ordering::Release);
                phase.finish(Ok(()));
                // Safety: just published by this thread
                Ok(unsafe { self.deref_published(raw) })
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

impl<T, F> Drop for DoubleCheckedCell<T, F> {
    fn drop(&mut self) {
        let ptr = *self.instance.get_mut();
        if !ptr.is_null() {
            // Safety: allocated by Box::into_raw in get_slow; `&mut self`
            // guarantees no outstanding borrows of the instance.
            drop(unsafe { Box::from_raw(ptr) });
        }
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for DoubleCheckedCell<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ptr = self.instance.load(Ordering::Acquire);
        // Safety: non-null, acquire-loaded
        let value = (!ptr.is_null()).then(|| unsafe { self.deref_published(ptr) });
        f.debug_struct("DoubleCheckedCell")
            .field("name", &self.name)
            .field("value", &value)
            .finish()
    }
}
