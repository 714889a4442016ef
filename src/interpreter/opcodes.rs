//! Opcode definitions.
//!
//! Each opcode is a value carrying its validated immediates; dispatch is a
//! flat variant match in the interpreter. The canonical mnemonic table below
//! drives both unknown-opcode detection and language-version gating in the
//! assembler.

use crate::interpreter::fields::{AssetHoldingField, AssetParamsField, GlobalField, TxField};

macro_rules! opcode_table {
    ( $( $version:literal => [ $( $mnemonic:literal ),* $(,)? ] ),* $(,)? ) => {
        /// Language version each mnemonic first appeared in, or `None` for
        /// unknown mnemonics.
        pub fn min_version(mnemonic: &str) -> Option<u64> {
            match mnemonic {
                $( $( $mnemonic )|* => Some($version), )*
                _ => None,
            }
        }
    };
}

opcode_table! {
    1 => [
        "+", "-", "*", "/", "%",
        "<", ">", "<=", ">=", "==", "!=",
        "&&", "||", "!",
        "&", "|", "^", "~",
        "mulw",
        "len", "itob", "btoi",
        "sha256", "keccak256", "sha512_256", "ed25519verify",
        "intcblock", "intc", "intc_0", "intc_1", "intc_2", "intc_3",
        "bytecblock", "bytec", "bytec_0", "bytec_1", "bytec_2", "bytec_3",
        "int", "byte", "addr", "arg",
        "bnz", "pop", "dup", "err",
        "store", "load",
        "txn", "gtxn", "global",
    ],
    2 => [
        "addw", "concat", "substring", "substring3",
        "bz", "b", "return", "dup2",
        "txna", "gtxna",
        "app_opted_in",
        "app_local_get", "app_local_get_ex",
        "app_global_get", "app_global_get_ex",
        "app_local_put", "app_global_put",
        "app_local_del", "app_global_del",
        "balance", "asset_holding_get", "asset_params_get",
    ],
    3 => [
        "assert", "dig", "swap", "select",
        "gtxns", "gtxnsa",
        "pushint", "pushbytes",
        "min_balance",
        "setbit", "getbit", "setbyte", "getbyte",
    ],
}

/// One assembled instruction with its immediates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    // arithmetic / comparison / logic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Neq,
    And,
    Or,
    Not,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    Addw,
    Mulw,

    // byte strings
    Len,
    Itob,
    Btoi,
    Concat,
    Substring { start: u64, end: u64 },
    Substring3,

    // hashing & signatures
    Sha256,
    Keccak256,
    Sha512_256,
    Ed25519Verify,

    // constants
    IntcBlock { values: Vec<u64> },
    Intc { index: usize },
    BytecBlock { values: Vec<Vec<u8>> },
    Bytec { index: usize },
    PushInt { value: u64 },
    PushBytes { value: Vec<u8> },
    Arg { index: usize },

    // control flow
    Label { name: String },
    Bnz { label: String },
    Bz { label: String },
    B { label: String },
    Return,
    Err,
    Assert,
    Dup,
    Dup2,
    Pop,
    Swap,
    Dig { depth: u64 },
    Select,

    // bit / byte indexing
    SetBit,
    GetBit,
    SetByte,
    GetByte,

    // scratch
    Store { index: usize },
    Load { index: usize },

    // transaction & global introspection
    Txn { field: TxField },
    Txna { field: TxField, index: u64 },
    Gtxn { group: usize, field: TxField },
    Gtxna { group: usize, field: TxField, index: u64 },
    Gtxns { field: TxField },
    Gtxnsa { field: TxField, index: u64 },
    Global { field: GlobalField },

    // application & asset state
    AppOptedIn,
    AppLocalGet,
    AppLocalGetEx,
    AppGlobalGet,
    AppGlobalGetEx,
    AppLocalPut,
    AppGlobalPut,
    AppLocalDel,
    AppGlobalDel,
    Balance,
    MinBalance,
    AssetHoldingGet { field: AssetHoldingField },
    AssetParamsGet { field: AssetParamsField },
}

impl Op {
    /// Canonical mnemonic, used in diagnostics.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Mod => "%",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
            Op::Eq => "==",
            Op::Neq => "!=",
            Op::And => "&&",
            Op::Or => "||",
            Op::Not => "!",
            Op::BitAnd => "&",
            Op::BitOr => "|",
            Op::BitXor => "^",
            Op::BitNot => "~",
            Op::Addw => "addw",
            Op::Mulw => "mulw",
            Op::Len => "len",
            Op::Itob => "itob",
            Op::Btoi => "btoi",
            Op::Concat => "concat",
            Op::Substring { .. } => "substring",
            Op::Substring3 => "substring3",
            Op::Sha256 => "sha256",
            Op::Keccak256 => "keccak256",
            Op::Sha512_256 => "sha512_256",
            Op::Ed25519Verify => "ed25519verify",
            Op::IntcBlock { .. } => "intcblock",
            Op::Intc { .. } => "intc",
            Op::BytecBlock { .. } => "bytecblock",
            Op::Bytec { .. } => "bytec",
            Op::PushInt { .. } => "pushint",
            Op::PushBytes { .. } => "pushbytes",
            Op::Arg { .. } => "arg",
            Op::Label { .. } => "label",
            Op::Bnz { .. } => "bnz",
            Op::Bz { .. } => "bz",
            Op::B { .. } => "b",
            Op::Return => "return",
            Op::Err => "err",
            Op::Assert => "assert",
            Op::Dup => "dup",
            Op::Dup2 => "dup2",
            Op::Pop => "pop",
            Op::Swap => "swap",
            Op::Dig { .. } => "dig",
            Op::Select => "select",
            Op::SetBit => "setbit",
            Op::GetBit => "getbit",
            Op::SetByte => "setbyte",
            Op::GetByte => "getbyte",
            Op::Store { .. } => "store",
            Op::Load { .. } => "load",
            Op::Txn { .. } => "txn",
            Op::Txna { .. } => "txna",
            Op::Gtxn { .. } => "gtxn",
            Op::Gtxna { .. } => "gtxna",
            Op::Gtxns { .. } => "gtxns",
            Op::Gtxnsa { .. } => "gtxnsa",
            Op::Global { .. } => "global",
            Op::AppOptedIn => "app_opted_in",
            Op::AppLocalGet => "app_local_get",
            Op::AppLocalGetEx => "app_local_get_ex",
            Op::AppGlobalGet => "app_global_get",
            Op::AppGlobalGetEx => "app_global_get_ex",
            Op::AppLocalPut => "app_local_put",
            Op::AppGlobalPut => "app_global_put",
            Op::AppLocalDel => "app_local_del",
            Op::AppGlobalDel => "app_global_del",
            Op::Balance => "balance",
            Op::MinBalance => "min_balance",
            Op::AssetHoldingGet { .. } => "asset_holding_get",
            Op::AssetParamsGet { .. } => "asset_params_get",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_table_lookup() {
        assert_eq!(min_version("+"), Some(1));
        assert_eq!(min_version("concat"), Some(2));
        assert_eq!(min_version("gtxns"), Some(3));
        assert_eq!(min_version("not_an_opcode"), None);
    }

    #[test]
    fn mnemonics_match_table() {
        assert_eq!(Op::Add.mnemonic(), "+");
        assert_eq!(Op::Substring { start: 0, end: 0 }.mnemonic(), "substring");
        assert_eq!(Op::MinBalance.mnemonic(), "min_balance");
        assert!(min_version(Op::Concat.mnemonic()).is_some());
    }
}
