/*!
 * Property Tests
 *
 * For arbitrary thread and call counts, a fresh cell constructs once and
 * hands every caller the same instance
 */

use process_singleton::{DoubleCheckedCell, HolderCell, InstanceId, SynchronizedCell};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

/// Run `calls` gets on each of `threads` threads, return distinct identities seen
fn distinct_ids<F>(threads: usize, calls: usize, get: F) -> HashSet<InstanceId>
where
    F: Fn() -> InstanceId + Sync,
{
    let barrier = Barrier::new(threads);
    thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    (0..calls).map(|_| get()).collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_double_checked_one_instance(threads in 1usize..16, calls in 1usize..64, seed in any::<u64>()) {
        let builds = AtomicUsize::new(0);
        let cell = DoubleCheckedCell::new("prop_dcl", || {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(seed)
        });

        let ids = distinct_ids(threads, calls, || InstanceId::of(cell.get().unwrap()));
        prop_assert_eq!(ids.len(), 1);
        prop_assert_eq!(builds.load(Ordering::SeqCst), 1);
        prop_assert_eq!(*cell.get().unwrap(), seed);
    }

    #[test]
    fn prop_holder_one_instance(threads in 1usize..16, calls in 1usize..64) {
        let builds = AtomicUsize::new(0);
        let cell = HolderCell::new("prop_holder", || {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8; 32])
        });

        let ids = distinct_ids(threads, calls, || InstanceId::of(cell.get().unwrap()));
        prop_assert_eq!(ids.len(), 1);
        prop_assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn prop_synchronized_failure_runs_once(threads in 1usize..16, calls in 1usize..16) {
        let runs = AtomicUsize::new(0);
        let cell = SynchronizedCell::new("prop_sync", || -> anyhow::Result<u8> {
            runs.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("refused")
        });

        let barrier = Barrier::new(threads);
        let failures: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        (0..calls).filter(|_| cell.get().is_err()).count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        prop_assert_eq!(failures, threads * calls);
        prop_assert_eq!(runs.load(Ordering::SeqCst), 1);
        prop_assert!(!cell.is_initialized());
    }
}
