/*!
 * Telemetry Config Tests
 */

use pretty_assertions::assert_eq;
use process_singleton::TelemetryConfig;
use serial_test::serial;
use std::time::Duration;

const TRACE_JSON_VAR: &str = "SINGLETON_TRACE_JSON";
const SLOW_INIT_VAR: &str = "SINGLETON_SLOW_INIT_MS";

fn clear_env() {
    std::env::remove_var(TRACE_JSON_VAR);
    std::env::remove_var(SLOW_INIT_VAR);
}

#[test]
#[serial]
fn test_defaults_without_env() {
    clear_env();
    assert_eq!(TelemetryConfig::from_env(), TelemetryConfig::default());
    assert_eq!(
        TelemetryConfig::default().slow_init_threshold,
        Duration::from_millis(10)
    );
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var(TRACE_JSON_VAR, "true");
    std::env::set_var(SLOW_INIT_VAR, "250");

    let config = TelemetryConfig::from_env();
    assert_eq!(
        config,
        TelemetryConfig {
            json: true,
            slow_init_threshold: Duration::from_millis(250),
        }
    );
    clear_env();
}

#[test]
#[serial]
fn test_json_flag_spellings() {
    clear_env();
    for (value, expected) in [("1", true), ("YES", true), ("on", true), ("0", false), ("off", false)] {
        std::env::set_var(TRACE_JSON_VAR, value);
        assert_eq!(TelemetryConfig::from_env().json, expected, "value {value:?}");
    }
    clear_env();
}

#[test]
#[serial]
fn test_unparseable_threshold_falls_back() {
    clear_env();
    std::env::set_var(SLOW_INIT_VAR, "soon");
    assert_eq!(
        TelemetryConfig::from_env().slow_init_threshold,
        Duration::from_millis(10)
    );
    clear_env();
}
