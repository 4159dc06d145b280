/*!
 * Construction
 * Runs an initializer inside an `InitSpan` and records the attempt
 */

use crate::core::sync::InitStrategy;
use crate::monitoring::{InitCounters, InitSpan};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::error;

/// Outcome of a construction attempt that must not unwind through the cell
pub(crate) enum Outcome<T> {
    Built(T),
    Failed(String),
    /// The initializer panicked; the cell records `reason`, then resumes `payload`
    Panicked {
        reason: String,
        payload: Box<dyn Any + Send + 'static>,
    },
}

/// Run `init` once, converting its error into a failure reason
///
/// Panics propagate; the attempt is still counted as a failure.
pub(crate) fn build<T, F>(
    singleton: &'static str,
    strategy: InitStrategy,
    counters: &InitCounters,
    init: &F,
) -> Result<T, String>
where
    F: Fn() -> anyhow::Result<T>,
{
    let span = InitSpan::new(singleton, strategy);
    let _entered = span.enter();
    let attempt = counters.begin();

    match init() {
        Ok(value) => {
            attempt.succeed();
            span.record_success();
            Ok(value)
        }
        Err(err) => {
            drop(attempt);
            // Alternate format keeps the whole context chain
            let reason = format!("{err:#}");
            span.record_error(&reason);
            error!(singleton, %strategy, error = %reason, "singleton construction failed");
            Err(reason)
        }
    }
}

/// Like [`build`], but catches a panic so the caller can record it first
pub(crate) fn build_catching<T, F>(
    singleton: &'static str,
    strategy: InitStrategy,
    counters: &InitCounters,
    init: &F,
) -> Outcome<T>
where
    F: Fn() -> anyhow::Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| {
        build(singleton, strategy, counters, init)
    })) {
        Ok(Ok(value)) => Outcome::Built(value),
        Ok(Err(reason)) => Outcome::Failed(reason),
        Err(payload) => {
            let reason = panic_reason(payload.as_ref());
            error!(singleton, %strategy, error = %reason, "singleton constructor panicked");
            Outcome::Panicked { reason, payload }
        }
    }
}

/// Human-readable reason for a caught panic
pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str));

    match message {
        Some(message) => format!("constructor panicked: {message}"),
        None => "constructor panicked".to_string(),
    }
}
