/*!
 * Construction Tracing Tests
 *
 * Captures the events cells emit while constructing
 */

use process_singleton::monitoring::telemetry;
use process_singleton::{init_tracing, DoubleCheckedCell, HolderCell, InitSpan, InitStrategy};
use serial_test::serial;
use std::io;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory log sink
#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture_json<F: FnOnce()>(f: F) -> String {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(capture.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.contents()
}

#[test]
fn test_failure_logged_with_reason() {
    let logs = capture_json(|| {
        let cell = HolderCell::new("traced_failure", || -> anyhow::Result<u8> {
            anyhow::bail!("socket closed")
        });
        assert!(cell.get().is_err());
    });

    assert!(logs.contains("singleton construction failed"), "logs: {logs}");
    assert!(logs.contains("socket closed"));
    assert!(logs.contains("traced_failure"));
    assert!(logs.contains("\"level\":\"ERROR\""));
}

#[test]
fn test_success_logs_span_lifecycle() {
    let logs = capture_json(|| {
        let cell = DoubleCheckedCell::new("traced_success", || Ok(1u8));
        cell.get().unwrap();
        // Steady-state calls emit nothing
        cell.get().unwrap();
    });

    assert_eq!(logs.matches("construction started").count(), 1);
    assert!(logs.contains("double_checked"));
}

#[test]
fn test_reentrancy_logged_as_warning() {
    static CELL: HolderCell<u8> = HolderCell::new("traced_loop", || Ok(*CELL.get()?));

    let logs = capture_json(|| {
        assert!(CELL.get().is_err());
    });
    assert!(logs.contains("reentrant singleton initialization"));
    assert!(logs.contains("\"level\":\"WARN\""));
}

#[test]
fn test_slow_construction_warns() {
    let threshold = telemetry().slow_init_threshold;
    let logs = capture_json(|| {
        let cell = HolderCell::new("traced_slow", move || {
            thread::sleep(threshold + Duration::from_millis(5));
            Ok(0u8)
        });
        cell.get().unwrap();
    });

    let warning = logs
        .lines()
        .find(|line| line.contains("slow singleton construction"))
        .unwrap_or_else(|| panic!("no slow warning in logs: {logs}"));
    assert!(warning.contains("\"level\":\"WARN\""));
    assert!(warning.contains("\"slow\":true"));
    assert!(warning.contains("traced_slow"));
}

#[test]
fn test_init_span_standalone() {
    let logs = capture_json(|| {
        let span = InitSpan::new("manual", InitStrategy::Holder);
        let _entered = span.enter();
        span.record_success();
    });
    assert!(logs.contains("manual"));
}

#[test]
#[serial]
fn test_init_tracing_installs_once() {
    init_tracing();
    // Only one global subscriber per process
    assert!(!init_tracing());
}
