/*!
 * Process Singleton Library
 * Process-wide, write-once singleton cells with selectable initialization strategy
 *
 * Four strategies share one contract (`get() -> SingletonResult<&T>`):
 * - `EagerCell`: constructed when its `Module` is loaded, never constructs in `get`
 * - `SynchronizedCell`: constructed on first `get`, mutex held for every call
 * - `DoubleCheckedCell`: constructed on first `get`, lock-free after publication
 * - `HolderCell`: constructed on first `get` through the std one-time-init primitive
 */

pub mod core;
pub mod monitoring;
pub mod singleton;

// Re-exports
pub use crate::core::errors::{SingletonError, SingletonResult};
pub use crate::core::sync::InitStrategy;
pub use crate::monitoring::{init_tracing, InitSpan, InitStats, TelemetryConfig};
pub use crate::singleton::{
    same_instance, DoubleCheckedCell, EagerCell, HolderCell, InitResult, InstanceId, Module,
    ModuleState, Preload, Singleton, SynchronizedCell,
};
