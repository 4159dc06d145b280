/*!
 * Initialization Strategy
 *
 * Names the four interchangeable strategies and their trade-offs
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy a singleton cell uses to construct and publish its instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStrategy {
    /// Constructed when the defining module loads, before `get` is reachable
    Eager,
    /// Constructed on first `get`; the mutex is held for every call
    SynchronizedLazy,
    /// Constructed on first `get`; lock taken only on the construction race
    DoubleChecked,
    /// Constructed on first `get` by the std one-time-init primitive
    Holder,
}

impl InitStrategy {
    /// All strategies, in declaration order
    pub const ALL: [InitStrategy; 4] = [
        InitStrategy::Eager,
        InitStrategy::SynchronizedLazy,
        InitStrategy::DoubleChecked,
        InitStrategy::Holder,
    ];

    /// Whether construction is deferred until the first `get`
    #[inline]
    pub const fn is_lazy(self) -> bool {
        !matches!(self, InitStrategy::Eager)
    }

    /// Whether `get` takes a lock even after the instance exists
    #[inline]
    pub const fn locks_on_hot_path(self) -> bool {
        matches!(self, InitStrategy::SynchronizedLazy)
    }

    /// Stable lowercase name, used as a tracing field
    pub const fn as_str(self) -> &'static str {
        match self {
            InitStrategy::Eager => "eager",
            InitStrategy::SynchronizedLazy => "synchronized_lazy",
            InitStrategy::DoubleChecked => "double_checked",
            InitStrategy::Holder => "holder",
        }
    }
}

impl fmt::Display for InitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
