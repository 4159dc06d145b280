/*!
 * Singleton Declaration Macro
 */

/// Implement [`Singleton`](crate::Singleton) for a type with a chosen strategy
///
/// Lazy strategies declare their cell as a `static` local to `instance()`, so
/// the cell is not referenced until the first call. The eager form forwards
/// to an `EagerCell` the caller declared alongside its `Module`.
///
/// ```
/// use process_singleton::{singleton, InitResult, Singleton};
///
/// pub struct Registry {
///     entries: Vec<&'static str>,
/// }
///
/// impl Registry {
///     fn build() -> InitResult<Self> {
///         Ok(Self { entries: vec!["a", "b"] })
///     }
/// }
///
/// singleton!(Registry, double_checked, Registry::build);
///
/// let a = Registry::instance().unwrap();
/// let b = Registry::instance().unwrap();
/// assert!(std::ptr::eq(a, b));
/// assert_eq!(a.entries.len(), 2);
/// ```
#[macro_export]
macro_rules! singleton {
    ($ty:ty, eager($cell:path)) => {
        impl $crate::Singleton for $ty {
            const STRATEGY: $crate::InitStrategy = $crate::InitStrategy::Eager;

            fn instance() -> $crate::SingletonResult<&'static Self> {
                $cell.get()
            }
        }
    };
    ($ty:ty, synchronized, $init:expr) => {
        $crate::singleton!(@lazy $ty, SynchronizedCell, SynchronizedLazy, $init);
    };
    ($ty:ty, double_checked, $init:expr) => {
        $crate::singleton!(@lazy $ty, DoubleCheckedCell, DoubleChecked, $init);
    };
    ($ty:ty, holder, $init:expr) => {
        $crate::singleton!(@lazy $ty, HolderCell, Holder, $init);
    };
    (@lazy $ty:ty, $cell:ident, $strategy:ident, $init:expr) => {
        impl $crate::Singleton for $ty {
            const STRATEGY: $crate::InitStrategy = $crate::InitStrategy::$strategy;

            fn instance() -> $crate::SingletonResult<&'static Self> {
                static CELL: $crate::$cell<$ty> = $crate::$cell::new(stringify!($ty), $init);
                CELL.get()
            }
        }
    };
}
