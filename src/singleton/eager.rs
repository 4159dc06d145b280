/*!
 * Eager Cell
 *
 * Constructed unconditionally when the owning `Module` loads, whether or not
 * anyone ever calls `get`. Once the module is loaded, `get` never constructs
 * and never blocks: it reads the module state (acquire) and the stored value.
 */

use super::construct::build;
use super::module::{Module, ModuleState, Preload};
use crate::core::errors::{SingletonError, SingletonResult};
use crate::core::sync::InitStrategy;
use crate::monitoring::{InitCounters, InitStats};
use std::sync::OnceLock;

/// Singleton constructed at module load
pub struct EagerCell<T, F = fn() -> anyhow::Result<T>> {
    name: &'static str,
    module: &'static Module,
    value: OnceLock<T>,
    init: F,
    counters: InitCounters,
}

impl<T, F> EagerCell<T, F> {
    pub const fn new(name: &'static str, module: &'static Module, init: F) -> Self {
        Self {
            name,
            module,
            value: OnceLock::new(),
            init,
            counters: InitCounters::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub const fn strategy(&self) -> InitStrategy {
        InitStrategy::Eager
    }

    pub fn module(&self) -> &'static Module {
        self.module
    }

    pub fn is_initialized(&self) -> bool {
        self.module.is_loaded() && self.value.get().is_some()
    }

    pub fn stats(&self) -> InitStats {
        self.counters.snapshot()
    }

    /// Return the instance built when the module loaded
    ///
    /// While the module is loading, its own member constructors may read
    /// members declared before them. Any other thread waits for the load
    /// to finish. A module that has not been loaded yet is loaded by the
    /// first `get` on one of its members, so every returned outcome is
    /// final.
    #[inline]
    pub fn get(&self) -> SingletonResult<&T> {
        match self.module.state() {
            ModuleState::Loaded => self.value.get().ok_or_else(|| self.not_a_member()),
            ModuleState::Loading if self.module.is_loading_here() => self
                .value
                .get()
                .ok_or_else(|| SingletonError::reentrant(self.name)),
            ModuleState::Failed => Err(self.module.failure_error(self.name)),
            ModuleState::Loading | ModuleState::Unloaded => self.get_after_load(),
        }
    }

    /// Load the module (or wait for the thread loading it), then read
    #[cold]
    fn get_after_load(&self) -> SingletonResult<&T> {
        match self.module.load() {
            Ok(()) => self.value.get().ok_or_else(|| self.not_a_member()),
            Err(_) => Err(self.module.failure_error(self.name)),
        }
    }

    #[cold]
    fn not_a_member(&self) -> SingletonError {
        SingletonError::initialization_failed(
            self.name,
            format!("not constructed by module `{}`", self.module.name()),
        )
    }
}

impl<T, F> Preload for EagerCell<T, F>
where
    T: Send + Sync,
    F: Fn() -> anyhow::Result<T> + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn preload(&self) -> Result<(), String> {
        if self.value.get().is_some() {
            return Ok(());
        }
        let value = build(self.name, InitStrategy::Eager, &self.counters, &self.init)?;
        let _ = self.value.set(value);
        Ok(())
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for EagerCell<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EagerCell")
            .field("name", &self.name)
            .field("module", &self.module.name())
            .field("value", &self.value.get())
            .finish()
    }
}
