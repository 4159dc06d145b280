/*!
 * Singleton Cells
 *
 * Process-wide, write-once cells. Every strategy exposes the same contract:
 * `get()` returns the one shared instance, or the reason it cannot exist.
 *
 * ## Strategies
 *
 * - **EagerCell**: built when its `Module` loads; `get` never constructs
 * - **SynchronizedCell**: built on first `get`; mutex held for every call
 * - **DoubleCheckedCell**: built on first `get`; acquire-load fast path
 * - **HolderCell**: built on first `get`; `OnceLock` does the synchronization
 *
 * ## Identity
 *
 * The shared instance is a reference. Two callers observed the same
 * instance iff `same_instance(a, b)`; `InstanceId` captures that identity as
 * a value that can be logged or compared later.
 */

mod construct;
mod double_checked;
mod eager;
mod holder;
mod macros;
mod module;
mod synchronized;

pub use double_checked::DoubleCheckedCell;
pub use eager::EagerCell;
pub use holder::HolderCell;
pub use module::{Module, ModuleState, Preload};
pub use synchronized::SynchronizedCell;

use crate::core::errors::SingletonResult;
use crate::core::sync::InitStrategy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type returned by initializers
pub type InitResult<T> = anyhow::Result<T>;

/// A type with exactly one instance per process
///
/// Usually implemented through [`singleton!`](crate::singleton!).
pub trait Singleton: Sized + Send + Sync + 'static {
    /// Strategy backing `instance`
    const STRATEGY: InitStrategy;

    /// The shared instance
    fn instance() -> SingletonResult<&'static Self>;
}

/// Whether `a` and `b` are the same object (identity, not equality)
#[inline]
pub fn same_instance<T: ?Sized>(a: &T, b: &T) -> bool {
    std::ptr::eq(a as *const T as *const (), b as *const T as *const ())
}

/// Address-based identity of a shared instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(usize);

impl InstanceId {
    #[inline]
    pub fn of<T: ?Sized>(instance: &T) -> Self {
        Self(instance as *const T as *const () as usize)
    }

    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
