/*!
 * Synchronization Building Blocks
 *
 * Pieces every singleton cell is assembled from:
 * - `InitStrategy`: which initialization strategy a cell implements
 * - `Phase`: write-once lifecycle of a lazily constructed slot
 * - `InFlight`: per-thread registry of constructions in progress, used to
 *   fail fast on re-entrant initialization instead of self-deadlocking
 *
 * # Mutation discipline
 *
 * Every cell owns exactly one slot. The slot moves
 * `Uninit -> Constructing -> Ready | Failed` and never moves back.
 */

mod phase;
mod reentrancy;
mod strategy;

pub use strategy::InitStrategy;

pub(crate) use phase::Phase;
pub(crate) use reentrancy::{key_of, InFlight};
