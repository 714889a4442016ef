//! Shared helpers for engine and interpreter tests.
