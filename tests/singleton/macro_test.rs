/*!
 * Macro Tests
 *
 * `singleton!` wires a type to each strategy behind `Singleton::instance`
 */

use process_singleton::{
    same_instance, singleton, EagerCell, InitResult, InitStrategy, Module, Singleton,
    SingletonError,
};
use std::collections::HashMap;
use std::sync::Barrier;
use std::thread;

pub struct Catalog {
    items: HashMap<&'static str, u32>,
}

impl Catalog {
    fn load() -> InitResult<Self> {
        let items = [("apple", 3), ("pear", 5)].into_iter().collect();
        Ok(Self { items })
    }
}

pub struct Counter {
    start: u64,
}

pub struct Registry {
    names: Vec<String>,
}

pub struct Limits {
    max_open: usize,
}

pub struct Broken;

singleton!(Catalog, synchronized, Catalog::load);
singleton!(Counter, double_checked, || Ok(Counter { start: 100 }));
singleton!(Registry, holder, || Ok(Registry {
    names: vec!["alpha".into(), "beta".into()],
}));
singleton!(Broken, double_checked, || anyhow::bail!("driver missing"));

static RUNTIME: Module = Module::new("runtime", &[&LIMITS]);
static LIMITS: EagerCell<Limits> = EagerCell::new("limits", &RUNTIME, || Ok(Limits { max_open: 1024 }));

singleton!(Limits, eager(LIMITS));

fn assert_shared<T: Singleton>() {
    let barrier = Barrier::new(8);
    let first = T::instance().unwrap();
    thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                barrier.wait();
                assert!(same_instance(first, T::instance().unwrap()));
            });
        }
    });
}

#[test]
fn test_strategy_constants() {
    assert_eq!(Catalog::STRATEGY, InitStrategy::SynchronizedLazy);
    assert_eq!(Counter::STRATEGY, InitStrategy::DoubleChecked);
    assert_eq!(Registry::STRATEGY, InitStrategy::Holder);
    assert_eq!(Limits::STRATEGY, InitStrategy::Eager);
}

#[test]
fn test_lazy_instances_shared() {
    assert_shared::<Catalog>();
    assert_shared::<Counter>();
    assert_shared::<Registry>();

    assert_eq!(Catalog::instance().unwrap().items["pear"], 5);
    assert_eq!(Counter::instance().unwrap().start, 100);
    assert_eq!(Registry::instance().unwrap().names.len(), 2);
}

#[test]
fn test_eager_instance_after_load() {
    RUNTIME.load().unwrap();
    assert_shared::<Limits>();
    assert_eq!(Limits::instance().unwrap().max_open, 1024);
}

#[test]
fn test_failed_macro_singleton() {
    let first = Broken::instance().map(|_| ()).unwrap_err();
    assert!(matches!(first, SingletonError::InitializationFailed { .. }));
    assert_eq!(first.singleton(), "Broken");

    let second = Broken::instance().map(|_| ()).unwrap_err();
    assert!(matches!(second, SingletonError::AlreadyFailed { .. }));
    assert_eq!(second.reason(), Some("driver missing"));
}
