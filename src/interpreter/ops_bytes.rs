//! Byte-string manipulation, bit/byte indexing, hashing, and signature
//! verification handlers.
//!
//! Bit numbering: for integers, bit 0 is the least-significant bit of the
//! 64-bit representation; for byte strings, bit 0 is the most-significant
//! bit of the first byte.

use crate::crypto::key_pair::PublicKey;
use crate::crypto::logic_sig::progdata_message;
use crate::errors::RuntimeError;
use crate::interpreter::interpreter::Interpreter;
use crate::types::address::Address;
use crate::types::value::{Value, MAX_BYTES_LEN};
use ed25519_dalek::Signature;
use sha2::{Digest, Sha256, Sha512_256};
use sha3::Keccak256;

impl Interpreter<'_> {
    pub(crate) fn op_len(&mut self) -> Result<(), RuntimeError> {
        let bytes = self.stack.pop_bytes()?;
        self.stack.push(Value::Uint64(bytes.len() as u64))
    }

    /// uint64 → 8 big-endian bytes.
    pub(crate) fn op_itob(&mut self) -> Result<(), RuntimeError> {
        let v = self.stack.pop_uint64()?;
        self.stack.push(Value::Bytes(v.to_be_bytes().to_vec()))
    }

    /// Big-endian bytes (≤ 8) → uint64.
    pub(crate) fn op_btoi(&mut self) -> Result<(), RuntimeError> {
        let bytes = self.stack.pop_bytes()?;
        if bytes.len() > 8 {
            return Err(RuntimeError::LongInputError { len: bytes.len() });
        }
        let mut v: u64 = 0;
        for b in &bytes {
            v = (v << 8) | *b as u64;
        }
        self.stack.push(Value::Uint64(v))
    }

    pub(crate) fn op_concat(&mut self) -> Result<(), RuntimeError> {
        let b = self.stack.pop_bytes()?;
        let mut a = self.stack.pop_bytes()?;
        if a.len() + b.len() > MAX_BYTES_LEN {
            return Err(RuntimeError::ConcatError { len: a.len() + b.len() });
        }
        a.extend_from_slice(&b);
        self.stack.push(Value::Bytes(a))
    }

    fn substring(&mut self, bytes: Vec<u8>, start: u64, end: u64) -> Result<(), RuntimeError> {
        if start > end {
            return Err(RuntimeError::SubstringEndBeforeStart { start, end });
        }
        if end > bytes.len() as u64 {
            return Err(RuntimeError::SubstringRangeBeyond {
                end,
                len: bytes.len() as u64,
            });
        }
        self.stack
            .push(Value::Bytes(bytes[start as usize..end as usize].to_vec()))
    }

    pub(crate) fn op_substring(&mut self, start: u64, end: u64) -> Result<(), RuntimeError> {
        let bytes = self.stack.pop_bytes()?;
        self.substring(bytes, start, end)
    }

    pub(crate) fn op_substring3(&mut self) -> Result<(), RuntimeError> {
        let end = self.stack.pop_uint64()?;
        let start = self.stack.pop_uint64()?;
        let bytes = self.stack.pop_bytes()?;
        self.substring(bytes, start, end)
    }

    pub(crate) fn op_sha256(&mut self) -> Result<(), RuntimeError> {
        let bytes = self.stack.pop_bytes()?;
        let digest: [u8; 32] = Sha256::digest(&bytes).into();
        self.stack.push(Value::Bytes(digest.to_vec()))
    }

    pub(crate) fn op_keccak256(&mut self) -> Result<(), RuntimeError> {
        let bytes = self.stack.pop_bytes()?;
        let digest: [u8; 32] = Keccak256::digest(&bytes).into();
        self.stack.push(Value::Bytes(digest.to_vec()))
    }

    pub(crate) fn op_sha512_256(&mut self) -> Result<(), RuntimeError> {
        let bytes = self.stack.pop_bytes()?;
        let digest: [u8; 32] = Sha512_256::digest(&bytes).into();
        self.stack.push(Value::Bytes(digest.to_vec()))
    }

    /// Pops (public key, signature, data), top first, and pushes 1 if the
    /// signature verifies over `"ProgData" ‖ program-hash ‖ data`.
    pub(crate) fn op_ed25519verify(&mut self) -> Result<(), RuntimeError> {
        let key_bytes = self.stack.pop_bytes()?;
        let sig_bytes = self.stack.pop_bytes()?;
        let data = self.stack.pop_bytes()?;

        let message = progdata_message(&self.program_hash(), &data);
        let valid = match (
            Address::from_slice(&key_bytes).and_then(PublicKey::from_address),
            Signature::from_slice(&sig_bytes),
        ) {
            (Some(pk), Ok(sig)) => pk.verify(&message, &sig),
            _ => false,
        };
        self.stack.push(Value::from_bool(valid))
    }

    pub(crate) fn op_setbit(&mut self) -> Result<(), RuntimeError> {
        let bit = self.stack.pop_uint64()?;
        let index = self.stack.pop_uint64()?;
        let target = self.stack.pop()?;
        if bit > 1 {
            return Err(RuntimeError::SetBitValueError { value: bit });
        }
        match target {
            Value::Uint64(v) => {
                if index > 63 {
                    return Err(RuntimeError::IndexOutOfBound { index, len: 64 });
                }
                let mask = 1u64 << index;
                let out = if bit == 1 { v | mask } else { v & !mask };
                self.stack.push(Value::Uint64(out))
            }
            Value::Bytes(mut bytes) => {
                let bit_len = bytes.len() * 8;
                if index >= bit_len as u64 {
                    return Err(RuntimeError::IndexOutOfBound {
                        index,
                        len: bit_len,
                    });
                }
                let byte_index = (index / 8) as usize;
                let mask = 0x80u8 >> (index % 8);
                if bit == 1 {
                    bytes[byte_index] |= mask;
                } else {
                    bytes[byte_index] &= !mask;
                }
                self.stack.push(Value::Bytes(bytes))
            }
        }
    }

    pub(crate) fn op_getbit(&mut self) -> Result<(), RuntimeError> {
        let index = self.stack.pop_uint64()?;
        let target = self.stack.pop()?;
        let bit = match target {
            Value::Uint64(v) => {
                if index > 63 {
                    return Err(RuntimeError::IndexOutOfBound { index, len: 64 });
                }
                (v >> index) & 1
            }
            Value::Bytes(bytes) => {
                let bit_len = bytes.len() * 8;
                if index >= bit_len as u64 {
                    return Err(RuntimeError::IndexOutOfBound {
                        index,
                        len: bit_len,
                    });
                }
                let byte = bytes[(index / 8) as usize];
                ((byte >> (7 - index % 8)) & 1) as u64
            }
        };
        self.stack.push(Value::Uint64(bit))
    }

    pub(crate) fn op_setbyte(&mut self) -> Result<(), RuntimeError> {
        let value = self.stack.pop_uint64()?;
        let index = self.stack.pop_uint64()?;
        let mut bytes = self.stack.pop_bytes()?;
        if value > 255 {
            return Err(RuntimeError::InvalidUint8 { value });
        }
        if index >= bytes.len() as u64 {
            return Err(RuntimeError::IndexOutOfBound {
                index,
                len: bytes.len(),
            });
        }
        bytes[index as usize] = value as u8;
        self.stack.push(Value::Bytes(bytes))
    }

    pub(crate) fn op_getbyte(&mut self) -> Result<(), RuntimeError> {
        let index = self.stack.pop_uint64()?;
        let bytes = self.stack.pop_bytes()?;
        if index >= bytes.len() as u64 {
            return Err(RuntimeError::IndexOutOfBound {
                index,
                len: bytes.len(),
            });
        }
        self.stack.push(Value::Uint64(bytes[index as usize] as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::interpreter::tests::run_stateless;

    #[test]
    fn len_of_bytes() {
        assert!(run_stateless("#pragma version 1\nbyte 0x010203\nlen\nint 3\n==").is_ok());
    }

    #[test]
    fn itob_btoi_roundtrip() {
        let src = "#pragma version 1\nint 511\nitob\nbtoi\nint 511\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn itob_is_big_endian() {
        let src = "#pragma version 1\nint 1\nitob\nbyte 0x0000000000000001\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn btoi_accepts_short_input() {
        assert!(run_stateless("#pragma version 1\nbyte 0x01ff\nbtoi\nint 511\n==").is_ok());
    }

    #[test]
    fn btoi_nine_bytes_fails() {
        let src = "#pragma version 1\nbyte 0x010203040506070809\nbtoi";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::LongInputError { len: 9 }
        ));
    }

    #[test]
    fn concat_appends() {
        let src = "#pragma version 2\nbyte 0x0102\nbyte 0x0304\nconcat\nbyte 0x01020304\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn concat_over_limit_fails() {
        // 4096-byte literal concatenated with one byte
        let big = "ff".repeat(4096);
        let src = format!("#pragma version 2\nbyte 0x{big}\nbyte 0x01\nconcat");
        assert!(matches!(
            run_stateless(&src).unwrap_err().root(),
            RuntimeError::ConcatError { len: 4097 }
        ));
    }

    #[test]
    fn substring_extracts_range() {
        let src = "#pragma version 2\nbyte 0x0102030405\nsubstring 1 3\nbyte 0x0203\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn substring_whole_string_is_identity() {
        let src = "#pragma version 2\nbyte 0x0102\nsubstring 0 2\nbyte 0x0102\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn substring_end_before_start() {
        let src = "#pragma version 2\nbyte 0x0102\nsubstring 2 1";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::SubstringEndBeforeStart { start: 2, end: 1 }
        ));
    }

    #[test]
    fn substring_beyond_length() {
        let src = "#pragma version 2\nbyte 0x0102\nsubstring 0 3";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::SubstringRangeBeyond { end: 3, len: 2 }
        ));
    }

    #[test]
    fn substring3_pops_indices() {
        let src = "#pragma version 2\nbyte 0x0102030405\nint 1\nint 3\nsubstring3\nbyte 0x0203\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn sha256_known_vector() {
        // sha256("") = e3b0c442...
        let src = "#pragma version 1\nbyte \"\"\nsha256\n\
                   byte 0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn keccak256_known_vector() {
        // keccak256("") = c5d24601...
        let src = "#pragma version 1\nbyte \"\"\nkeccak256\n\
                   byte 0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn sha512_256_known_vector() {
        // sha512/256("") = c672b8d1...
        let src = "#pragma version 1\nbyte \"\"\nsha512_256\n\
                   byte 0xc672b8d1ef56ed28ab87c3622c5114069bdd3ad7b8f9737498d0c01ecef0967a\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn hashes_are_32_bytes() {
        for op in ["sha256", "keccak256", "sha512_256"] {
            let src = format!("#pragma version 1\nbyte 0x01\n{op}\nlen\nint 32\n==");
            assert!(run_stateless(&src).is_ok(), "{op}");
        }
    }

    #[test]
    fn ed25519verify_rejects_garbage() {
        // malformed key and signature push 0 rather than erroring
        let src = "#pragma version 1\n\
                   byte 0x01\nbyte 0x02\nbyte 0x03\ned25519verify\nint 0\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn setbit_on_uint_is_lsb_first() {
        let src = "#pragma version 3\nint 0\nint 3\nint 1\nsetbit\nint 8\n==";
        assert!(run_stateless(src).is_ok());
        let src = "#pragma version 3\nint 8\nint 3\nint 0\nsetbit\nint 0\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn setbit_on_bytes_is_msb_first() {
        let src = "#pragma version 3\nbyte 0x00\nint 0\nint 1\nsetbit\nbyte 0x80\n==";
        assert!(run_stateless(src).is_ok());
        let src = "#pragma version 3\nbyte 0x0000\nint 9\nint 1\nsetbit\nbyte 0x0040\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn setbit_value_must_be_bit() {
        let src = "#pragma version 3\nint 0\nint 0\nint 2\nsetbit";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::SetBitValueError { value: 2 }
        ));
    }

    #[test]
    fn setbit_restores_cleared_bit() {
        // setbit(setbit(x, i, 0), i, 1) == x | (1 << i)
        let src = "#pragma version 3\n\
                   int 12\nint 2\nint 0\nsetbit\nint 2\nint 1\nsetbit\nint 12\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn getbit_reads_back() {
        let src = "#pragma version 3\nint 8\nint 3\ngetbit\nint 1\n==";
        assert!(run_stateless(src).is_ok());
        let src = "#pragma version 3\nbyte 0x80\nint 0\ngetbit\nint 1\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn bit_index_out_of_range() {
        let src = "#pragma version 3\nint 0\nint 64\ngetbit";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::IndexOutOfBound { index: 64, len: 64 }
        ));
        let src = "#pragma version 3\nbyte 0x00\nint 8\ngetbit";
        assert!(run_stateless(src).is_err());
    }

    #[test]
    fn setbyte_getbyte() {
        let src = "#pragma version 3\nbyte 0x0000\nint 1\nint 255\nsetbyte\nbyte 0x00ff\n==";
        assert!(run_stateless(src).is_ok());
        let src = "#pragma version 3\nbyte 0x0a0b\nint 1\ngetbyte\nint 11\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn setbyte_value_must_be_uint8() {
        let src = "#pragma version 3\nbyte 0x00\nint 0\nint 256\nsetbyte";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::InvalidUint8 { value: 256 }
        ));
    }

    #[test]
    fn byte_index_out_of_range() {
        let src = "#pragma version 3\nbyte 0x00\nint 1\ngetbyte";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::IndexOutOfBound { index: 1, len: 1 }
        ));
    }
}
