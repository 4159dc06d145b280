/*!
 * Re-entrancy Detection
 *
 * Tracks, per thread, which cells are currently being constructed. A cell
 * consults this registry before touching its (non-reentrant) lock so a
 * constructor that asks for its own instance fails fast instead of
 * deadlocking on the lock it already holds.
 */

use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static IN_FLIGHT: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Registry key for a cell: its address
///
/// Stable for the lifetime of the cell, which is all the registry needs.
#[inline]
pub(crate) fn key_of<T>(cell: &T) -> usize {
    cell as *const T as usize
}

/// Marks a construction as in progress on the current thread
///
/// Removed from the registry on drop, including during unwinding.
pub(crate) struct InFlight {
    key: usize,
    // Registry entries belong to the thread that created them
    _not_send: PhantomData<*const ()>,
}

impl InFlight {
    /// Register `key`, or return `None` if it is already in flight here
    pub(crate) fn enter(key: usize) -> Option<Self> {
        IN_FLIGHT.with(|keys| {
            let mut keys = keys.borrow_mut();
            if keys.contains(&key) {
                None
            } else {
                keys.push(key);
                Some(Self {
                    key,
                    _not_send: PhantomData,
                })
            }
        })
    }

    /// Whether the current thread is constructing `key`
    pub(crate) fn is_active(key: usize) -> bool {
        IN_FLIGHT
            .try_with(|keys| keys.borrow().contains(&key))
            .unwrap_or(false)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        // The registry may already be gone during thread teardown
        let _ = IN_FLIGHT.try_with(|keys| {
            let mut keys = keys.borrow_mut();
            if let Some(pos) = keys.iter().rposition(|&k| k == self.key) {
                keys.swap_remove(pos);
            }
        });
    }
}
