//! Transaction, global, and asset field sets with their resolvers.
//!
//! Field names are parsed at assembly time (unknown names and names from a
//! newer language version reject there); resolution to [`Value`]s happens at
//! execute time against the encoded transaction record.

use crate::core::transaction::EncodedTx;
use crate::errors::RuntimeError;
use crate::types::address::Address;
use crate::types::value::Value;

/// Scalar and array fields of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxField {
    Sender,
    Fee,
    FirstValid,
    /// Reserved: reading it always fails.
    FirstValidTime,
    LastValid,
    Note,
    Lease,
    Receiver,
    Amount,
    CloseRemainderTo,
    VotePK,
    SelectionPK,
    VoteFirst,
    VoteLast,
    VoteKeyDilution,
    Type,
    TypeEnum,
    XferAsset,
    AssetAmount,
    AssetSender,
    AssetReceiver,
    AssetCloseTo,
    GroupIndex,
    TxID,
    ApplicationID,
    OnCompletion,
    ApplicationArgs,
    NumAppArgs,
    Accounts,
    NumAccounts,
    ApprovalProgram,
    ClearStateProgram,
    RekeyTo,
    ConfigAsset,
    ConfigAssetTotal,
    ConfigAssetDecimals,
    ConfigAssetDefaultFrozen,
    ConfigAssetUnitName,
    ConfigAssetName,
    ConfigAssetURL,
    ConfigAssetMetadataHash,
    ConfigAssetManager,
    ConfigAssetReserve,
    ConfigAssetFreeze,
    ConfigAssetClawback,
    FreezeAsset,
    FreezeAssetAccount,
    FreezeAssetFrozen,
    Assets,
    NumAssets,
    Applications,
    NumApplications,
    GlobalNumUint,
    GlobalNumByteSlice,
    LocalNumUint,
    LocalNumByteSlice,
}

impl TxField {
    /// Parses a field name, rejecting unknown names and names introduced in
    /// a newer language version than the program declares.
    pub fn parse(name: &str, version: u64) -> Result<TxField, RuntimeError> {
        use TxField::*;
        let field = match name {
            "Sender" => Sender,
            "Fee" => Fee,
            "FirstValid" => FirstValid,
            "FirstValidTime" => FirstValidTime,
            "LastValid" => LastValid,
            "Note" => Note,
            "Lease" => Lease,
            "Receiver" => Receiver,
            "Amount" => Amount,
            "CloseRemainderTo" => CloseRemainderTo,
            "VotePK" => VotePK,
            "SelectionPK" => SelectionPK,
            "VoteFirst" => VoteFirst,
            "VoteLast" => VoteLast,
            "VoteKeyDilution" => VoteKeyDilution,
            "Type" => Type,
            "TypeEnum" => TypeEnum,
            "XferAsset" => XferAsset,
            "AssetAmount" => AssetAmount,
            "AssetSender" => AssetSender,
            "AssetReceiver" => AssetReceiver,
            "AssetCloseTo" => AssetCloseTo,
            "GroupIndex" => GroupIndex,
            "TxID" => TxID,
            "ApplicationID" => ApplicationID,
            "OnCompletion" => OnCompletion,
            "ApplicationArgs" => ApplicationArgs,
            "NumAppArgs" => NumAppArgs,
            "Accounts" => Accounts,
            "NumAccounts" => NumAccounts,
            "ApprovalProgram" => ApprovalProgram,
            "ClearStateProgram" => ClearStateProgram,
            "RekeyTo" => RekeyTo,
            "ConfigAsset" => ConfigAsset,
            "ConfigAssetTotal" => ConfigAssetTotal,
            "ConfigAssetDecimals" => ConfigAssetDecimals,
            "ConfigAssetDefaultFrozen" => ConfigAssetDefaultFrozen,
            "ConfigAssetUnitName" => ConfigAssetUnitName,
            "ConfigAssetName" => ConfigAssetName,
            "ConfigAssetURL" => ConfigAssetURL,
            "ConfigAssetMetadataHash" => ConfigAssetMetadataHash,
            "ConfigAssetManager" => ConfigAssetManager,
            "ConfigAssetReserve" => ConfigAssetReserve,
            "ConfigAssetFreeze" => ConfigAssetFreeze,
            "ConfigAssetClawback" => ConfigAssetClawback,
            "FreezeAsset" => FreezeAsset,
            "FreezeAssetAccount" => FreezeAssetAccount,
            "FreezeAssetFrozen" => FreezeAssetFrozen,
            "Assets" => Assets,
            "NumAssets" => NumAssets,
            "Applications" => Applications,
            "NumApplications" => NumApplications,
            "GlobalNumUint" => GlobalNumUint,
            "GlobalNumByteSlice" => GlobalNumByteSlice,
            "LocalNumUint" => LocalNumUint,
            "LocalNumByteSlice" => LocalNumByteSlice,
            _ => {
                return Err(RuntimeError::UnknownTxField {
                    field: name.to_string(),
                })
            }
        };
        if field.min_version() > version {
            return Err(RuntimeError::UnknownTxField {
                field: name.to_string(),
            });
        }
        Ok(field)
    }

    /// Language version the field first appeared in.
    fn min_version(&self) -> u64 {
        use TxField::*;
        match self {
            ApplicationID | OnCompletion | ApplicationArgs | NumAppArgs | Accounts
            | NumAccounts | ApprovalProgram | ClearStateProgram | RekeyTo | ConfigAsset
            | ConfigAssetTotal | ConfigAssetDecimals | ConfigAssetDefaultFrozen
            | ConfigAssetUnitName | ConfigAssetName | ConfigAssetURL
            | ConfigAssetMetadataHash | ConfigAssetManager | ConfigAssetReserve
            | ConfigAssetFreeze | ConfigAssetClawback | FreezeAsset | FreezeAssetAccount
            | FreezeAssetFrozen => 2,
            Assets | NumAssets | Applications | NumApplications | GlobalNumUint
            | GlobalNumByteSlice | LocalNumUint | LocalNumByteSlice => 3,
            _ => 1,
        }
    }

    /// True for fields accessed with an index (`txna` and friends).
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            TxField::ApplicationArgs | TxField::Accounts | TxField::Assets | TxField::Applications
        )
    }
}

fn addr_value(addr: &Option<Address>) -> Value {
    Value::Bytes(addr.unwrap_or(Address::zero()).to_vec())
}

/// Resolves a scalar transaction field to a value.
pub fn resolve_tx_field(tx: &EncodedTx, field: TxField) -> Result<Value, RuntimeError> {
    use TxField::*;
    let value = match field {
        Sender => Value::Bytes(tx.snd.to_vec()),
        Fee => Value::Uint64(tx.fee),
        FirstValid => Value::Uint64(tx.fv),
        FirstValidTime => {
            return Err(RuntimeError::InvalidFieldType {
                field: "FirstValidTime".to_string(),
            })
        }
        LastValid => Value::Uint64(tx.lv),
        Note => Value::Bytes(tx.note.clone()),
        Lease => Value::Bytes(tx.lx.to_vec()),
        Receiver => addr_value(&tx.rcv),
        Amount => Value::Uint64(tx.amt),
        CloseRemainderTo => addr_value(&tx.close),
        VotePK => Value::Bytes(tx.votekey.clone()),
        SelectionPK => Value::Bytes(tx.selkey.clone()),
        VoteFirst => Value::Uint64(tx.votefst),
        VoteLast => Value::Uint64(tx.votelst),
        VoteKeyDilution => Value::Uint64(tx.votekd),
        Type => Value::Bytes(tx.typ.tag().as_bytes().to_vec()),
        TypeEnum => Value::Uint64(tx.typ.type_enum()),
        XferAsset => Value::Uint64(tx.xaid),
        AssetAmount => Value::Uint64(tx.aamt),
        AssetSender => addr_value(&tx.asnd),
        AssetReceiver => addr_value(&tx.arcv),
        AssetCloseTo => addr_value(&tx.aclose),
        GroupIndex => Value::Uint64(tx.group_index),
        TxID => Value::Bytes(tx.txid.to_vec()),
        ApplicationID => Value::Uint64(tx.apid),
        OnCompletion => Value::Uint64(tx.apan as u64),
        NumAppArgs => Value::Uint64(tx.apaa.len() as u64),
        NumAccounts => Value::Uint64(tx.apat.len() as u64),
        ApprovalProgram => Value::Bytes(tx.apap.as_bytes().to_vec()),
        ClearStateProgram => Value::Bytes(tx.apsu.as_bytes().to_vec()),
        RekeyTo => addr_value(&tx.rekey),
        ConfigAsset => Value::Uint64(tx.caid),
        ConfigAssetTotal => Value::Uint64(tx.apar.as_ref().map_or(0, |p| p.total)),
        ConfigAssetDecimals => Value::Uint64(tx.apar.as_ref().map_or(0, |p| p.decimals as u64)),
        ConfigAssetDefaultFrozen => {
            Value::Uint64(tx.apar.as_ref().map_or(0, |p| p.default_frozen as u64))
        }
        ConfigAssetUnitName => {
            Value::Bytes(tx.apar.as_ref().map_or_else(Vec::new, |p| {
                p.unit_name.as_bytes().to_vec()
            }))
        }
        ConfigAssetName => Value::Bytes(
            tx.apar
                .as_ref()
                .map_or_else(Vec::new, |p| p.asset_name.as_bytes().to_vec()),
        ),
        ConfigAssetURL => Value::Bytes(
            tx.apar
                .as_ref()
                .map_or_else(Vec::new, |p| p.url.as_bytes().to_vec()),
        ),
        ConfigAssetMetadataHash => Value::Bytes(
            tx.apar
                .as_ref()
                .map_or_else(|| vec![0; 32], |p| p.metadata_hash.to_vec()),
        ),
        ConfigAssetManager => {
            Value::Bytes(tx.apar.as_ref().map_or(Address::zero(), |p| p.manager).to_vec())
        }
        ConfigAssetReserve => {
            Value::Bytes(tx.apar.as_ref().map_or(Address::zero(), |p| p.reserve).to_vec())
        }
        ConfigAssetFreeze => {
            Value::Bytes(tx.apar.as_ref().map_or(Address::zero(), |p| p.freeze).to_vec())
        }
        ConfigAssetClawback => {
            Value::Bytes(tx.apar.as_ref().map_or(Address::zero(), |p| p.clawback).to_vec())
        }
        FreezeAsset => Value::Uint64(tx.faid),
        FreezeAssetAccount => addr_value(&tx.fadd),
        FreezeAssetFrozen => Value::Uint64(tx.afrz as u64),
        NumAssets => Value::Uint64(tx.apas.len() as u64),
        NumApplications => Value::Uint64(tx.apfa.len() as u64),
        GlobalNumUint => Value::Uint64(tx.apgs.num_uint),
        GlobalNumByteSlice => Value::Uint64(tx.apgs.num_byte_slice),
        LocalNumUint => Value::Uint64(tx.apls.num_uint),
        LocalNumByteSlice => Value::Uint64(tx.apls.num_byte_slice),
        ApplicationArgs | Accounts | Assets | Applications => {
            return Err(RuntimeError::InvalidFieldType {
                field: format!("{:?}", field),
            })
        }
    };
    Ok(value)
}

/// Resolves an array transaction field at the given index.
///
/// `Accounts` index 0 is the sender; `Applications` index 0 is the called
/// application; other arrays are indexed directly.
pub fn resolve_tx_array_field(
    tx: &EncodedTx,
    field: TxField,
    index: u64,
) -> Result<Value, RuntimeError> {
    let out_of_bounds = |len: usize| RuntimeError::IndexOutOfBound { index, len };
    match field {
        TxField::ApplicationArgs => tx
            .apaa
            .get(index as usize)
            .map(|arg| Value::Bytes(arg.clone()))
            .ok_or(out_of_bounds(tx.apaa.len())),
        TxField::Accounts => {
            if index == 0 {
                return Ok(Value::Bytes(tx.snd.to_vec()));
            }
            tx.apat
                .get(index as usize - 1)
                .map(|addr| Value::Bytes(addr.to_vec()))
                .ok_or(out_of_bounds(tx.apat.len() + 1))
        }
        TxField::Assets => tx
            .apas
            .get(index as usize)
            .map(|id| Value::Uint64(*id))
            .ok_or(out_of_bounds(tx.apas.len())),
        TxField::Applications => {
            if index == 0 {
                return Ok(Value::Uint64(tx.apid));
            }
            tx.apfa
                .get(index as usize - 1)
                .map(|id| Value::Uint64(*id))
                .ok_or(out_of_bounds(tx.apfa.len() + 1))
        }
        other => Err(RuntimeError::InvalidFieldType {
            field: format!("{:?}", other),
        }),
    }
}

/// Fields readable through the `global` opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlobalField {
    MinTxnFee,
    MinBalance,
    MaxTxnLife,
    ZeroAddress,
    GroupSize,
    LogicSigVersion,
    Round,
    LatestTimestamp,
    CurrentApplicationID,
    CreatorAddress,
}

impl GlobalField {
    pub fn parse(name: &str, version: u64) -> Result<GlobalField, RuntimeError> {
        use GlobalField::*;
        let field = match name {
            "MinTxnFee" => MinTxnFee,
            "MinBalance" => MinBalance,
            "MaxTxnLife" => MaxTxnLife,
            "ZeroAddress" => ZeroAddress,
            "GroupSize" => GroupSize,
            "LogicSigVersion" => LogicSigVersion,
            "Round" => Round,
            "LatestTimestamp" => LatestTimestamp,
            "CurrentApplicationID" => CurrentApplicationID,
            "CreatorAddress" => CreatorAddress,
            _ => {
                return Err(RuntimeError::UnknownGlobalField {
                    field: name.to_string(),
                })
            }
        };
        let required = match field {
            MinTxnFee | MinBalance | MaxTxnLife | ZeroAddress | GroupSize => 1,
            LogicSigVersion | Round | LatestTimestamp | CurrentApplicationID => 2,
            CreatorAddress => 3,
        };
        if required > version {
            return Err(RuntimeError::UnknownGlobalField {
                field: name.to_string(),
            });
        }
        Ok(field)
    }
}

/// Fields readable through `asset_holding_get`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetHoldingField {
    AssetBalance,
    AssetFrozen,
}

impl AssetHoldingField {
    pub fn parse(name: &str) -> Result<AssetHoldingField, RuntimeError> {
        match name {
            "AssetBalance" => Ok(AssetHoldingField::AssetBalance),
            "AssetFrozen" => Ok(AssetHoldingField::AssetFrozen),
            _ => Err(RuntimeError::UnknownAssetField {
                field: name.to_string(),
            }),
        }
    }
}

/// Fields readable through `asset_params_get`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetParamsField {
    AssetTotal,
    AssetDecimals,
    AssetDefaultFrozen,
    AssetUnitName,
    AssetName,
    AssetURL,
    AssetMetadataHash,
    AssetManager,
    AssetReserve,
    AssetFreeze,
    AssetClawback,
}

impl AssetParamsField {
    pub fn parse(name: &str) -> Result<AssetParamsField, RuntimeError> {
        use AssetParamsField::*;
        match name {
            "AssetTotal" => Ok(AssetTotal),
            "AssetDecimals" => Ok(AssetDecimals),
            "AssetDefaultFrozen" => Ok(AssetDefaultFrozen),
            "AssetUnitName" => Ok(AssetUnitName),
            "AssetName" => Ok(AssetName),
            "AssetURL" => Ok(AssetURL),
            "AssetMetadataHash" => Ok(AssetMetadataHash),
            "AssetManager" => Ok(AssetManager),
            "AssetReserve" => Ok(AssetReserve),
            "AssetFreeze" => Ok(AssetFreeze),
            "AssetClawback" => Ok(AssetClawback),
            _ => Err(RuntimeError::UnknownAssetField {
                field: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{PayFlags, TxParams};

    fn addr(b: u8) -> Address {
        Address([b; 32])
    }

    fn pay_tx() -> EncodedTx {
        TxParams::TransferAlgo {
            from: addr(1),
            to: addr(2),
            amount: 100,
        }
        .to_encoded(&PayFlags::default())
    }

    #[test]
    fn parse_rejects_unknown_and_new_fields() {
        assert!(matches!(
            TxField::parse("NotAField", 4),
            Err(RuntimeError::UnknownTxField { .. })
        ));
        // ApplicationID appeared in version 2
        assert!(TxField::parse("ApplicationID", 1).is_err());
        assert!(TxField::parse("ApplicationID", 2).is_ok());
        // Assets appeared in version 3
        assert!(TxField::parse("Assets", 2).is_err());
        assert!(TxField::parse("Assets", 3).is_ok());
    }

    #[test]
    fn scalar_resolution() {
        let tx = pay_tx();
        assert_eq!(
            resolve_tx_field(&tx, TxField::Sender).unwrap(),
            Value::Bytes(addr(1).to_vec())
        );
        assert_eq!(
            resolve_tx_field(&tx, TxField::Amount).unwrap(),
            Value::Uint64(100)
        );
        assert_eq!(
            resolve_tx_field(&tx, TxField::Type).unwrap(),
            Value::Bytes(b"pay".to_vec())
        );
        assert_eq!(
            resolve_tx_field(&tx, TxField::TypeEnum).unwrap(),
            Value::Uint64(1)
        );
        // unset receiver-close defaults to the zero address
        assert_eq!(
            resolve_tx_field(&tx, TxField::CloseRemainderTo).unwrap(),
            Value::Bytes(vec![0; 32])
        );
    }

    #[test]
    fn first_valid_time_always_fails() {
        let tx = pay_tx();
        assert!(matches!(
            resolve_tx_field(&tx, TxField::FirstValidTime),
            Err(RuntimeError::InvalidFieldType { .. })
        ));
    }

    #[test]
    fn array_field_read_as_scalar_fails() {
        let tx = pay_tx();
        assert!(resolve_tx_field(&tx, TxField::Accounts).is_err());
    }

    #[test]
    fn accounts_index_zero_is_sender() {
        let mut tx = pay_tx();
        tx.apat = vec![addr(5)];
        assert_eq!(
            resolve_tx_array_field(&tx, TxField::Accounts, 0).unwrap(),
            Value::Bytes(addr(1).to_vec())
        );
        assert_eq!(
            resolve_tx_array_field(&tx, TxField::Accounts, 1).unwrap(),
            Value::Bytes(addr(5).to_vec())
        );
        assert!(matches!(
            resolve_tx_array_field(&tx, TxField::Accounts, 2),
            Err(RuntimeError::IndexOutOfBound { .. })
        ));
    }

    #[test]
    fn application_args_index_zero_is_first_arg() {
        let mut tx = pay_tx();
        tx.apaa = vec![b"first".to_vec()];
        assert_eq!(
            resolve_tx_array_field(&tx, TxField::ApplicationArgs, 0).unwrap(),
            Value::Bytes(b"first".to_vec())
        );
        assert!(resolve_tx_array_field(&tx, TxField::ApplicationArgs, 1).is_err());
    }

    #[test]
    fn applications_index_zero_is_called_app() {
        let mut tx = pay_tx();
        tx.apid = 42;
        tx.apfa = vec![7];
        assert_eq!(
            resolve_tx_array_field(&tx, TxField::Applications, 0).unwrap(),
            Value::Uint64(42)
        );
        assert_eq!(
            resolve_tx_array_field(&tx, TxField::Applications, 1).unwrap(),
            Value::Uint64(7)
        );
    }

    #[test]
    fn global_field_version_gating() {
        assert!(GlobalField::parse("Round", 1).is_err());
        assert!(GlobalField::parse("Round", 2).is_ok());
        assert!(GlobalField::parse("CreatorAddress", 2).is_err());
        assert!(GlobalField::parse("CreatorAddress", 3).is_ok());
        assert!(matches!(
            GlobalField::parse("Bogus", 4),
            Err(RuntimeError::UnknownGlobalField { .. })
        ));
    }

    #[test]
    fn asset_field_parsing() {
        assert!(AssetHoldingField::parse("AssetBalance").is_ok());
        assert!(AssetHoldingField::parse("AssetTotal").is_err());
        assert!(AssetParamsField::parse("AssetTotal").is_ok());
        assert!(matches!(
            AssetParamsField::parse("AssetBalance"),
            Err(RuntimeError::UnknownAssetField { .. })
        ));
    }
}
