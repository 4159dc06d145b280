/*!
 * Telemetry Configuration
 *
 * Environment-driven settings for the tracing layer:
 * - `SINGLETON_TRACE_JSON`: emit JSON instead of compact text (default: false)
 * - `SINGLETON_SLOW_INIT_MS`: constructions slower than this are logged at warn (default: 10)
 */

use std::sync::OnceLock;
use std::time::Duration;

const TRACE_JSON_VAR: &str = "SINGLETON_TRACE_JSON";
const SLOW_INIT_VAR: &str = "SINGLETON_SLOW_INIT_MS";

/// Telemetry settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// JSON output for production/parsing
    pub json: bool,
    /// Threshold above which a construction is reported as slow
    pub slow_init_threshold: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            json: false,
            slow_init_threshold: Duration::from_millis(10),
        }
    }
}

impl TelemetryConfig {
    /// Read settings from the environment, falling back to defaults
    ///
    /// Unparseable values are ignored rather than rejected.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let json = std::env::var(TRACE_JSON_VAR)
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.json);

        let slow_init_threshold = std::env::var(SLOW_INIT_VAR)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.slow_init_threshold);

        Self {
            json,
            slow_init_threshold,
        }
    }
}

/// Process-wide telemetry settings, read from the environment on first use
///
/// Backed by a plain `OnceLock` rather than one of this crate's cells: the
/// cells report through `InitSpan`, which reads this.
pub fn telemetry() -> &'static TelemetryConfig {
    static TELEMETRY: OnceLock<TelemetryConfig> = OnceLock::new();
    TELEMETRY.get_or_init(TelemetryConfig::from_env)
}
