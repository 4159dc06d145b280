/*!
 * Construction Phase
 * Write-once lifecycle of a lazily constructed slot
 */

/// Lifecycle of a lazy slot
///
/// `Ready` and `Failed` are terminal. A failure reason is kept for the
/// lifetime of the cell so later callers observe the same failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Phase {
    Uninit,
    Constructing,
    Ready,
    Failed(String),
}

impl Phase {
    /// Transition taken when construction starts
    ///
    /// Returns false if the slot has already left `Uninit`.
    pub(crate) fn begin(&mut self) -> bool {
        if *self == Phase::Uninit {
            *self = Phase::Constructing;
            true
        } else {
            false
        }
    }

    pub(crate) fn finish(&mut self, outcome: Result<(), String>) {
        debug_assert_eq!(*self, Phase::Constructing);
        *self = match outcome {
            Ok(()) => Phase::Ready,
            Err(reason) => Phase::Failed(reason),
        };
    }
}
