//! Cryptography: ed25519 key pairs and logic signatures.

pub mod key_pair;
pub mod logic_sig;
