//! Ed25519 key pairs for transaction and logic-signature authorization.
//!
//! An account address is the raw 32-byte ed25519 verifying key, so address
//! recovery from a public key is the identity function.

use crate::types::address::Address;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::OsRng;

/// Private key for signing transactions and delegating logic signatures.
///
/// Generated using cryptographically secure randomness from the OS.
/// Never serialized or transmitted.
#[derive(Clone)]
pub struct PrivateKey {
    key: SigningKey,
}

/// Public key for signature verification.
///
/// The account address is the verifying key itself, so this type is a thin
/// `Copy` wrapper pairing the key with its address form.
#[derive(Copy, Clone, Debug)]
pub struct PublicKey {
    key: VerifyingKey,
    /// Address form of the key (the same 32 bytes).
    pub address: Address,
}

impl PrivateKey {
    /// Generates a new random private key using OS-provided entropy.
    pub fn new() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Creates a private key from raw seed bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(bytes),
        }
    }

    /// Derives the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        let vk = self.key.verifying_key();
        PublicKey {
            key: vk,
            address: Address(vk.to_bytes()),
        }
    }

    /// Address of the corresponding public key.
    pub fn address(&self) -> Address {
        self.public_key().address
    }

    /// Signs arbitrary data.
    pub fn sign(&self, data: &[u8]) -> Signature {
        self.key.sign(data)
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl PublicKey {
    /// Reconstructs a public key from an address.
    ///
    /// Returns `None` if the address bytes are not a valid curve point.
    pub fn from_address(address: Address) -> Option<PublicKey> {
        VerifyingKey::from_bytes(&address.0)
            .ok()
            .map(|key| PublicKey { key, address })
    }

    /// Verifies a signature against the given data.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise.
    pub fn verify(&self, data: &[u8], signature: &Signature) -> bool {
        self.key.verify(data, signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_success() {
        let private = PrivateKey::new();
        let public = private.public_key();

        let data = b"Hello World";
        let signature = private.sign(data);
        assert!(public.verify(data, &signature));
    }

    #[test]
    fn verify_fails_with_wrong_key() {
        let private = PrivateKey::new();
        let other = PrivateKey::new();

        let data = b"Hello World";
        let signature = other.sign(data);
        assert!(!private.public_key().verify(data, &signature));
    }

    #[test]
    fn verify_fails_with_tampered_data() {
        let private = PrivateKey::new();
        let public = private.public_key();

        let signature = private.sign(b"original");
        assert!(!public.verify(b"tampered", &signature));
    }

    #[test]
    fn address_is_verifying_key_bytes() {
        let private = PrivateKey::new();
        let public = private.public_key();
        let recovered = PublicKey::from_address(public.address).unwrap();

        let data = b"roundtrip";
        let signature = private.sign(data);
        assert!(recovered.verify(data, &signature));
    }

    #[test]
    fn from_bytes_is_deterministic() {
        let seed = [0x17u8; 32];
        let key1 = PrivateKey::from_bytes(&seed);
        let key2 = PrivateKey::from_bytes(&seed);
        assert_eq!(key1.address(), key2.address());
    }

    #[test]
    fn address_uniqueness() {
        assert_ne!(PrivateKey::new().address(), PrivateKey::new().address());
    }
}
