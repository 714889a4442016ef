//! Core type definitions for the runtime.
//!
//! This module provides the fundamental types shared by the interpreter and
//! the execution engine:
//! - `Value`: the typed stack value (uint64 or byte string)
//! - `Address`: 32-byte public-key address with a checksummed base-32 form

pub mod address;
pub mod value;
