//! Transaction model and execution engine.
//!
//! This module contains the engine half of the runtime:
//! - `transaction`: encoded transactions, ids, and caller-facing parameters
//! - `executor`: the transient execution context applying transactions
//! - `runtime`: the public façade owning the canonical world state

pub mod executor;
pub mod runtime;
pub mod transaction;


/// Most transactions allowed in one atomic group.
pub const MAX_GROUP_SIZE: usize = 16;

/// Minimum fee every transaction must pay, in micro-units.
pub const MIN_TXN_FEE: u64 = 1000;

/// Longest validity window between first-valid and last-valid rounds.
pub const MAX_TXN_LIFE: u64 = 1000;
