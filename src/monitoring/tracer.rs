/*!
 * Initialization Tracing
 * Structured tracing for singleton construction using the tracing crate
 *
 * Features:
 * - JSON-formatted logs for structured parsing
 * - One span per construction attempt with strategy and outcome fields
 * - Slow constructions reported at warn level
 */

use super::config::telemetry;
use crate::core::sync::InitStrategy;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SINGLETON_TRACE_JSON: Enable JSON output (default: false)
///
/// Returns false if a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if telemetry().json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        info!("Structured tracing initialized");
    }
    installed
}

/// Span covering one construction attempt
///
/// Records duration and outcome; on drop, logs a `slow` warning if the
/// construction exceeded the configured threshold.
pub struct InitSpan {
    span: tracing::Span,
    start: Instant,
    singleton: &'static str,
    strategy: InitStrategy,
}

impl InitSpan {
    pub fn new(singleton: &'static str, strategy: InitStrategy) -> Self {
        let span = span!(
            Level::DEBUG,
            "singleton_init",
            singleton = singleton,
            strategy = %strategy,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        {
            let _entered = span.enter();
            debug!(singleton, %strategy, "construction started");
        }

        Self {
            span,
            start: Instant::now(),
            singleton,
            strategy,
        }
    }

    pub fn record_success(&self) {
        self.span.record("result", "success");
    }

    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for InitSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > telemetry().slow_init_threshold {
            warn!(
                singleton = self.singleton,
                strategy = %self.strategy,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow singleton construction"
            );
        } else {
            debug!(
                singleton = self.singleton,
                strategy = %self.strategy,
                duration_us = duration.as_micros() as u64,
                "construction finished"
            );
        }
    }
}
