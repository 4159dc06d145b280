/*!
 * Singleton Modules
 *
 * A `Module` is a named group of eager cells that come into existence
 * together. Loading a module constructs every member in declaration order;
 * the module is usable only if every member succeeds. The bootstrap code of
 * a process loads its modules before spawning the threads that use them; a
 * module nobody loaded is loaded by the first `get` on one of its members.
 *
 * # Example
 *
 * ```
 * use process_singleton::{EagerCell, Module};
 *
 * struct Settings { workers: usize }
 *
 * static RUNTIME: Module = Module::new("runtime", &[&SETTINGS]);
 * static SETTINGS: EagerCell<Settings> =
 *     EagerCell::new("settings", &RUNTIME, || Ok(Settings { workers: 4 }));
 *
 * RUNTIME.load().unwrap();
 * assert_eq!(SETTINGS.get().unwrap().workers, 4);
 * ```
 */

use super::construct::panic_reason;
use crate::core::errors::{SingletonError, SingletonResult};
use crate::core::sync::{key_of, InFlight};
use parking_lot::Mutex;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// A member of a module: constructed once when the module loads
pub trait Preload: Sync {
    /// Member name, used in diagnostics
    fn name(&self) -> &'static str;

    /// Construct and store the member's instance
    ///
    /// Called by the owning module at most once. Returns the failure reason.
    fn preload(&self) -> Result<(), String>;
}

/// Load state of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

impl ModuleState {
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => ModuleState::Unloaded,
            1 => ModuleState::Loading,
            2 => ModuleState::Loaded,
            _ => ModuleState::Failed,
        }
    }
}

/// A named group of eager singletons loaded together
pub struct Module {
    name: &'static str,
    members: &'static [&'static dyn Preload],
    state: AtomicU8,
    failure: OnceLock<String>,
    load_lock: Mutex<()>,
}

impl Module {
    pub const fn new(name: &'static str, members: &'static [&'static dyn Preload]) -> Self {
        Self {
            name,
            members,
            state: AtomicU8::new(ModuleState::Unloaded as u8),
            failure: OnceLock::new(),
            load_lock: parking_lot::const_mutex(()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Current load state (acquire)
    #[inline]
    pub fn state(&self) -> ModuleState {
        ModuleState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.state() == ModuleState::Loaded
    }

    /// Failure reason, if loading failed
    pub fn failure(&self) -> Option<&str> {
        self.failure.get().map(String::as_str)
    }

    /// Whether the current thread is inside this module's `load`
    pub(crate) fn is_loading_here(&self) -> bool {
        InFlight::is_active(key_of(self))
    }

    /// Construct every member, in declaration order
    ///
    /// Runs at most once. Later calls return the recorded outcome without
    /// retrying; concurrent calls wait for the first to finish.
    pub fn load(&self) -> SingletonResult<()> {
        let key = key_of(self);
        if InFlight::is_active(key) {
            warn!(module = self.name, "module load re-entered from a member constructor");
            return Err(SingletonError::reentrant(self.name));
        }

        let _lock = self.load_lock.lock();
        match self.state() {
            ModuleState::Loaded => return Ok(()),
            ModuleState::Failed => {
                let reason = self.failure().unwrap_or("load failed").to_string();
                return Err(SingletonError::initialization_failed(self.name, reason));
            }
            ModuleState::Unloaded | ModuleState::Loading => {}
        }

        let _in_flight = InFlight::enter(key);
        self.state
            .store(ModuleState::Loading as u8, Ordering::Relaxed);
        info!(module = self.name, members = self.members.len(), "loading singleton module");

        for member in self.members {
            match panic::catch_unwind(AssertUnwindSafe(|| member.preload())) {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => return Err(self.fail(member.name(), &reason)),
                Err(payload) => {
                    self.fail(member.name(), &panic_reason(payload.as_ref()));
                    panic::resume_unwind(payload);
                }
            }
        }

        self.state
            .store(ModuleState::Loaded as u8, Ordering::Release);
        info!(module = self.name, "singleton module loaded");
        Ok(())
    }

    fn fail(&self, member: &str, reason: &str) -> SingletonError {
        let reason = format!("member `{member}` failed: {reason}");
        let _ = self.failure.set(reason.clone());
        self.state
            .store(ModuleState::Failed as u8, Ordering::Release);
        error!(module = self.name, error = %reason, "singleton module failed to load");
        SingletonError::initialization_failed(self.name, reason)
    }

    /// Error reported to users of a failed module
    pub(crate) fn failure_error(&self, singleton: &str) -> SingletonError {
        let reason = self
            .failure()
            .map(|r| format!("module `{}` failed to load: {r}", self.name))
            .unwrap_or_else(|| format!("module `{}` failed to load", self.name));
        SingletonError::initialization_failed(singleton, reason)
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<_> = self.members.iter().map(|m| m.name()).collect();
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("members", &members)
            .finish()
    }
}
