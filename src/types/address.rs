//! 32-byte account addresses with a checksummed base-32 text form.
//!
//! An address is a raw ed25519 public key. The canonical text form is
//! RFC-4648 base-32 (no padding) over `pubkey ‖ checksum`, where the
//! checksum is the last four bytes of SHA-512/256 of the public key.

use crate::errors::RuntimeError;
use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha512_256};
use std::fmt;

/// Address length in bytes.
pub const ADDRESS_SIZE: usize = 32;

/// Checksum length in bytes appended to the text form.
pub const CHECKSUM_SIZE: usize = 4;

/// Fixed-size 32-byte address identifying accounts.
///
/// This type is `Copy` for efficient passing in validation and lookup
/// operations.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; ADDRESS_SIZE]);

impl Address {
    /// The all-zero address, used as a sentinel for unset role addresses.
    pub const fn zero() -> Address {
        Address([0u8; ADDRESS_SIZE])
    }

    /// True if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_SIZE]
    }

    /// Returns the address as a byte slice.
    pub const fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns the address as a byte Vec.
    pub fn to_vec(self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Creates an address from a byte slice.
    ///
    /// Returns `None` if the slice length is not exactly [`ADDRESS_SIZE`].
    pub fn from_slice(slice: &[u8]) -> Option<Address> {
        if slice.len() != ADDRESS_SIZE {
            return None;
        }
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(slice);
        Some(Address(bytes))
    }

    fn checksum(&self) -> [u8; CHECKSUM_SIZE] {
        let digest: [u8; 32] = Sha512_256::digest(self.0).into();
        let mut sum = [0u8; CHECKSUM_SIZE];
        sum.copy_from_slice(&digest[32 - CHECKSUM_SIZE..]);
        sum
    }

    /// Encodes the address to its checksummed base-32 text form.
    pub fn encode(&self) -> String {
        let mut data = [0u8; ADDRESS_SIZE + CHECKSUM_SIZE];
        data[..ADDRESS_SIZE].copy_from_slice(&self.0);
        data[ADDRESS_SIZE..].copy_from_slice(&self.checksum());
        BASE32_NOPAD.encode(&data)
    }

    /// Decodes a checksummed base-32 text form back into an address.
    ///
    /// Returns `RuntimeError::InvalidAddr` on malformed base-32, wrong
    /// length, or checksum mismatch.
    pub fn decode(text: &str) -> Result<Address, RuntimeError> {
        let invalid = || RuntimeError::InvalidAddr {
            addr: text.to_string(),
        };
        let data = BASE32_NOPAD
            .decode(text.as_bytes())
            .map_err(|_| invalid())?;
        if data.len() != ADDRESS_SIZE + CHECKSUM_SIZE {
            return Err(invalid());
        }
        let addr = Address::from_slice(&data[..ADDRESS_SIZE]).ok_or_else(invalid)?;
        if data[ADDRESS_SIZE..] != addr.checksum() {
            return Err(invalid());
        }
        Ok(addr)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}
