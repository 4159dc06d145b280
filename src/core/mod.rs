/*!
 * Core Module
 * Error types and synchronization building blocks shared by every cell
 */

pub mod errors;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use sync::InitStrategy;
