/*!
 * Initialization Monitoring
 * Structured tracing, telemetry configuration, and per-cell construction stats
 */

mod config;
mod metrics;
mod tracer;

pub use config::{telemetry, TelemetryConfig};
pub use metrics::InitStats;
pub use tracer::{init_tracing, InitSpan};

pub(crate) use metrics::InitCounters;
