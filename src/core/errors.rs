/*!
 * Error Types
 * Singleton initialization errors with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by `get` on any singleton cell
///
/// Only two categories exist: construction did not produce an instance
/// (`InitializationFailed` / `AlreadyFailed`), or construction re-entered
/// the cell it was building (`ReentrantInitialization`).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SingletonError {
    #[error("Singleton `{singleton}` failed to initialize: {reason}")]
    #[diagnostic(
        code(singleton::initialization_failed),
        help("Construction failed and will not be retried for the lifetime of the process.")
    )]
    InitializationFailed { singleton: String, reason: String },

    #[error("Singleton `{singleton}` previously failed to initialize: {reason}")]
    #[diagnostic(
        code(singleton::already_failed),
        help("Another caller triggered construction and it failed. The failure is terminal.")
    )]
    AlreadyFailed { singleton: String, reason: String },

    #[error("Reentrant initialization of singleton `{singleton}`")]
    #[diagnostic(
        code(singleton::reentrant_initialization),
        help("The constructor asked for the instance it is building. Break the dependency cycle.")
    )]
    ReentrantInitialization { singleton: String },
}

impl SingletonError {
    pub(crate) fn initialization_failed(singleton: &str, reason: impl Into<String>) -> Self {
        Self::InitializationFailed {
            singleton: singleton.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn already_failed(singleton: &str, reason: impl Into<String>) -> Self {
        Self::AlreadyFailed {
            singleton: singleton.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn reentrant(singleton: &str) -> Self {
        Self::ReentrantInitialization {
            singleton: singleton.to_owned(),
        }
    }

    /// Name of the singleton the error refers to
    pub fn singleton(&self) -> &str {
        match self {
            Self::InitializationFailed { singleton, .. }
            | Self::AlreadyFailed { singleton, .. }
            | Self::ReentrantInitialization { singleton } => singleton,
        }
    }

    /// Construction failure reason, if this is an initialization failure
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::InitializationFailed { reason, .. } | Self::AlreadyFailed { reason, .. } => {
                Some(reason)
            }
            Self::ReentrantInitialization { .. } => None,
        }
    }

    /// True for both the first-observed and the already-failed forms
    pub fn is_initialization_failure(&self) -> bool {
        matches!(
            self,
            Self::InitializationFailed { .. } | Self::AlreadyFailed { .. }
        )
    }
}

/// Result type for singleton retrieval
pub type SingletonResult<T> = std::result::Result<T, SingletonError>;
