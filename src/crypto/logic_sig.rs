//! Logic signatures: programs that authorize transactions.
//!
//! A logic signature bundles program source bytes with optional
//! authorization material. It validates in one of three ways:
//! - *contract mode*: the sender address equals the hash-derived address of
//!   the program bytes,
//! - *delegated mode*: a single ed25519 signature over the program bytes
//!   verifies under the sender's public key,
//! - *delegated multisig mode*: a threshold of participant signatures over
//!   the program bytes verifies, and the multisig address equals the sender.
//!
//! All signing payloads are domain separated.

use crate::crypto::key_pair::{PrivateKey, PublicKey};
use crate::errors::RuntimeError;
use crate::types::address::Address;
use ed25519_dalek::Signature;
use sha2::{Digest, Sha512_256};

/// Domain prefix for program-derived addresses and delegation signatures.
const PROGRAM_PREFIX: &[u8] = b"Program";

/// Domain prefix for multisig participant-set addresses.
const MULTISIG_PREFIX: &[u8] = b"MultisigAddr";

/// Domain prefix for data verified by the `ed25519verify` opcode.
const PROGDATA_PREFIX: &[u8] = b"ProgData";

/// Hash of a program's source bytes, domain separated.
///
/// Doubles as the contract-mode address of the program.
pub fn program_hash(source: &str) -> [u8; 32] {
    let mut hasher = Sha512_256::new();
    hasher.update(PROGRAM_PREFIX);
    hasher.update(source.as_bytes());
    hasher.finalize().into()
}

/// Message bytes checked by the `ed25519verify` opcode:
/// `"ProgData" ‖ program-hash ‖ data`.
pub fn progdata_message(program_hash: &[u8; 32], data: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(PROGDATA_PREFIX.len() + 32 + data.len());
    msg.extend_from_slice(PROGDATA_PREFIX);
    msg.extend_from_slice(program_hash);
    msg.extend_from_slice(data);
    msg
}

/// A single participant slot in a multisig: the participant address and the
/// signature it has contributed, if any.
#[derive(Clone, Debug)]
pub struct Subsig {
    pub address: Address,
    pub signature: Option<Signature>,
}

/// Threshold multisignature over a fixed participant set.
#[derive(Clone, Debug)]
pub struct Multisig {
    pub version: u8,
    pub threshold: u8,
    pub subsigs: Vec<Subsig>,
}

impl Multisig {
    /// Creates an unsigned multisig shell for the given participants.
    pub fn new(version: u8, threshold: u8, participants: &[Address]) -> Multisig {
        Multisig {
            version,
            threshold,
            subsigs: participants
                .iter()
                .map(|&address| Subsig {
                    address,
                    signature: None,
                })
                .collect(),
        }
    }

    /// Address derived from the participant set.
    pub fn address(&self) -> Address {
        let mut hasher = Sha512_256::new();
        hasher.update(MULTISIG_PREFIX);
        hasher.update([self.version, self.threshold]);
        for sub in &self.subsigs {
            hasher.update(sub.address.as_slice());
        }
        Address(hasher.finalize().into())
    }

    /// Counts valid participant signatures over `message` and compares
    /// against the threshold.
    pub fn verify(&self, message: &[u8]) -> bool {
        let valid = self
            .subsigs
            .iter()
            .filter(|sub| match (&sub.signature, PublicKey::from_address(sub.address)) {
                (Some(sig), Some(pk)) => pk.verify(message, sig),
                _ => false,
            })
            .count();
        valid >= self.threshold as usize
    }
}

/// A logic signature: program source plus arguments and optional
/// authorization material.
#[derive(Clone, Debug)]
pub struct LogicSig {
    /// Program source text executed under the stateless interpreter.
    pub logic: String,
    /// Arguments visible to the program via the `arg` opcode.
    pub args: Vec<Vec<u8>>,
    /// Single delegation signature, if signed.
    pub sig: Option<Signature>,
    /// Multisig delegation material, if assembled.
    pub msig: Option<Multisig>,
}

impl LogicSig {
    /// Creates an unsigned (contract-mode) logic signature.
    pub fn new(logic: impl Into<String>, args: Vec<Vec<u8>>) -> LogicSig {
        LogicSig {
            logic: logic.into(),
            args,
            sig: None,
            msig: None,
        }
    }

    /// The bytes a delegating key signs: `"Program" ‖ source`.
    fn signing_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PROGRAM_PREFIX.len() + self.logic.len());
        bytes.extend_from_slice(PROGRAM_PREFIX);
        bytes.extend_from_slice(self.logic.as_bytes());
        bytes
    }

    /// Contract-mode address: the hash of the program bytes.
    pub fn address(&self) -> Address {
        Address(program_hash(&self.logic))
    }

    /// Signs the program bytes, switching the logic signature into
    /// delegated mode for the signer's account.
    pub fn sign(&mut self, key: &PrivateKey) {
        self.sig = Some(key.sign(&self.signing_bytes()));
    }

    /// Attaches a multisig participant set, then individual participants
    /// contribute via [`LogicSig::sign_multisig`].
    pub fn set_multisig(&mut self, msig: Multisig) {
        self.msig = Some(msig);
    }

    /// Contributes one participant signature to the attached multisig.
    ///
    /// Returns `LogicSignatureNotFound` if no multisig is attached or the
    /// key does not belong to the participant set.
    pub fn sign_multisig(&mut self, key: &PrivateKey) -> Result<(), RuntimeError> {
        let signature = key.sign(&self.signing_bytes());
        let address = key.address();
        let msig = self
            .msig
            .as_mut()
            .ok_or(RuntimeError::LogicSignatureNotFound)?;
        let slot = msig
            .subsigs
            .iter_mut()
            .find(|sub| sub.address == address)
            .ok_or(RuntimeError::LogicSignatureNotFound)?;
        slot.signature = Some(signature);
        Ok(())
    }

    /// Validates the logic signature for the given sender account.
    ///
    /// Delegated single-signature and multisig modes are checked first; an
    /// unsigned logic signature falls back to contract mode.
    pub fn verify(&self, sender: Address) -> Result<(), RuntimeError> {
        let failed = || RuntimeError::LogicSignatureValidationFailed {
            address: sender.encode(),
        };

        if let Some(sig) = &self.sig {
            let pk = PublicKey::from_address(sender).ok_or_else(failed)?;
            if pk.verify(&self.signing_bytes(), sig) {
                return Ok(());
            }
            return Err(failed());
        }

        if let Some(msig) = &self.msig {
            if msig.address() == sender && msig.verify(&self.signing_bytes()) {
                return Ok(());
            }
            return Err(failed());
        }

        if self.address() == sender {
            return Ok(());
        }
        Err(failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "#pragma version 1\nint 1";

    #[test]
    fn contract_mode_accepts_program_address() {
        let lsig = LogicSig::new(SRC, vec![]);
        assert!(lsig.verify(lsig.address()).is_ok());
    }

    #[test]
    fn contract_mode_rejects_other_address() {
        let lsig = LogicSig::new(SRC, vec![]);
        let other = PrivateKey::new().address();
        assert!(matches!(
            lsig.verify(other),
            Err(RuntimeError::LogicSignatureValidationFailed { .. })
        ));
    }

    #[test]
    fn delegated_mode_accepts_signer() {
        let key = PrivateKey::new();
        let mut lsig = LogicSig::new(SRC, vec![]);
        lsig.sign(&key);
        assert!(lsig.verify(key.address()).is_ok());
    }

    #[test]
    fn delegated_mode_rejects_non_signer() {
        let key = PrivateKey::new();
        let mut lsig = LogicSig::new(SRC, vec![]);
        lsig.sign(&key);
        let other = PrivateKey::new().address();
        assert!(lsig.verify(other).is_err());
    }

    #[test]
    fn delegated_mode_rejects_tampered_program() {
        let key = PrivateKey::new();
        let mut lsig = LogicSig::new(SRC, vec![]);
        lsig.sign(&key);
        lsig.logic = "#pragma version 1\nint 0".to_string();
        assert!(lsig.verify(key.address()).is_err());
    }

    #[test]
    fn multisig_threshold_verification() {
        let keys = [PrivateKey::new(), PrivateKey::new(), PrivateKey::new()];
        let addrs: Vec<Address> = keys.iter().map(|k| k.address()).collect();

        let mut lsig = LogicSig::new(SRC, vec![]);
        lsig.set_multisig(Multisig::new(1, 2, &addrs));
        let msig_addr = lsig.msig.as_ref().unwrap().address();

        // one signature is below the threshold
        lsig.sign_multisig(&keys[0]).unwrap();
        assert!(lsig.verify(msig_addr).is_err());

        // two signatures meet it
        lsig.sign_multisig(&keys[2]).unwrap();
        assert!(lsig.verify(msig_addr).is_ok());
    }

    #[test]
    fn multisig_rejects_unknown_participant() {
        let keys = [PrivateKey::new(), PrivateKey::new()];
        let addrs: Vec<Address> = keys.iter().map(|k| k.address()).collect();

        let mut lsig = LogicSig::new(SRC, vec![]);
        lsig.set_multisig(Multisig::new(1, 1, &addrs));
        assert!(lsig.sign_multisig(&PrivateKey::new()).is_err());
    }

    #[test]
    fn program_hash_is_deterministic_and_domain_separated() {
        assert_eq!(program_hash(SRC), program_hash(SRC));
        assert_ne!(program_hash(SRC), program_hash("int 1"));
    }

    #[test]
    fn progdata_message_layout() {
        let hash = program_hash(SRC);
        let msg = progdata_message(&hash, b"data");
        assert!(msg.starts_with(b"ProgData"));
        assert_eq!(&msg[8..40], &hash);
        assert!(msg.ends_with(b"data"));
    }
}
