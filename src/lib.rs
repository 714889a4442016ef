//! SCL execution runtime.
//!
//! An off-chain, deterministic runtime for the SCL stack-based smart-contract
//! language: a source assembler, a typed stack-machine interpreter, and a
//! transaction execution engine over a synthetic world state (accounts,
//! assets, applications).

pub mod core;
pub mod crypto;
pub mod errors;
pub mod interpreter;
pub mod ledger;
pub mod types;
pub mod utils;
