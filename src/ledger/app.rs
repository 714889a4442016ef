//! Application state: programs, schemas, and key-value stores.

use crate::errors::RuntimeError;
use crate::ledger::{
    APP_MIN_BALANCE, MAX_KEY_LEN, SCHEMA_BYTES_MIN_BALANCE, SCHEMA_UINT_MIN_BALANCE,
};
use crate::types::address::Address;
use crate::types::value::Value;
use std::collections::BTreeMap;

/// Ordered key-value store backing global and local application state.
pub type StateMap = BTreeMap<Vec<u8>, Value>;

/// Declared capacity of an application state store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateSchema {
    /// Number of uint64 slots.
    pub num_uint: u64,
    /// Number of byte-slice slots.
    pub num_byte_slice: u64,
}

impl StateSchema {
    pub fn new(num_uint: u64, num_byte_slice: u64) -> StateSchema {
        StateSchema {
            num_uint,
            num_byte_slice,
        }
    }

    /// Minimum-balance surcharge this schema imposes on the holding account.
    pub fn min_balance(&self) -> u64 {
        APP_MIN_BALANCE
            + SCHEMA_UINT_MIN_BALANCE * self.num_uint
            + SCHEMA_BYTES_MIN_BALANCE * self.num_byte_slice
    }

    /// Verifies that `map` fits within this schema's slot counts.
    pub fn assert_fits(&self, map: &StateMap) -> Result<(), RuntimeError> {
        let uints = map
            .values()
            .filter(|v| matches!(v, Value::Uint64(_)))
            .count() as u64;
        let byte_slices = map.len() as u64 - uints;
        if uints > self.num_uint {
            return Err(RuntimeError::SchemaExceeded {
                kind: "uint",
                limit: self.num_uint,
            });
        }
        if byte_slices > self.num_byte_slice {
            return Err(RuntimeError::SchemaExceeded {
                kind: "byte-slice",
                limit: self.num_byte_slice,
            });
        }
        Ok(())
    }
}

/// Validates an application state key before a write.
pub fn assert_valid_key(key: &[u8]) -> Result<(), RuntimeError> {
    if key.len() > MAX_KEY_LEN {
        return Err(RuntimeError::InvalidStateKey { len: key.len() });
    }
    Ok(())
}

/// An application as recorded on its creator's account.
#[derive(Clone, Debug)]
pub struct AppParams {
    /// Program run for create / opt-in / call / close / update / delete.
    pub approval_program: String,
    /// Program run on clear-state.
    pub clear_program: String,
    /// Account that created the application.
    pub creator: Address,
    /// Global key-value state.
    pub global_state: StateMap,
    /// Capacity of the global state.
    pub global_schema: StateSchema,
    /// Capacity of each opted-in account's local state.
    pub local_schema: StateSchema,
}

/// Per-account state slot for one opted-in application.
#[derive(Clone, Debug)]
pub struct LocalState {
    /// Local key-value state.
    pub state: StateMap,
    /// Schema copied from the application at opt-in time.
    pub schema: StateSchema,
}

impl LocalState {
    pub fn new(schema: StateSchema) -> LocalState {
        LocalState {
            state: StateMap::new(),
            schema,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_counts_by_value_type() {
        let schema = StateSchema::new(1, 1);
        let mut map = StateMap::new();
        map.insert(b"u".to_vec(), Value::Uint64(1));
        map.insert(b"b".to_vec(), Value::Bytes(vec![1]));
        assert!(schema.assert_fits(&map).is_ok());

        map.insert(b"u2".to_vec(), Value::Uint64(2));
        assert!(matches!(
            schema.assert_fits(&map),
            Err(RuntimeError::SchemaExceeded { kind: "uint", .. })
        ));
    }

    #[test]
    fn schema_rejects_excess_byte_slices() {
        let schema = StateSchema::new(0, 1);
        let mut map = StateMap::new();
        map.insert(b"a".to_vec(), Value::Bytes(vec![]));
        map.insert(b"b".to_vec(), Value::Bytes(vec![]));
        assert!(matches!(
            schema.assert_fits(&map),
            Err(RuntimeError::SchemaExceeded {
                kind: "byte-slice",
                ..
            })
        ));
    }

    #[test]
    fn schema_min_balance_scales_with_slots() {
        assert_eq!(StateSchema::new(0, 0).min_balance(), APP_MIN_BALANCE);
        assert_eq!(
            StateSchema::new(2, 1).min_balance(),
            APP_MIN_BALANCE + 2 * SCHEMA_UINT_MIN_BALANCE + SCHEMA_BYTES_MIN_BALANCE
        );
    }

    #[test]
    fn key_length_bound() {
        assert!(assert_valid_key(&[0u8; MAX_KEY_LEN]).is_ok());
        assert!(matches!(
            assert_valid_key(&[0u8; MAX_KEY_LEN + 1]),
            Err(RuntimeError::InvalidStateKey { .. })
        ));
    }
}
