//! Runtime error kinds with stable numeric codes.
//!
//! Every fatal condition in the assembler, the interpreter, and the
//! execution engine is a variant here. Codes are grouped by origin:
//! 1000-range for assembly, 1100-range for interpreter, 1300-range for
//! world/engine errors. Source-line context is attached by wrapping the
//! original error in [`RuntimeError::AtLine`].

use scl_derive::Error;

/// Errors raised while assembling or executing a program, or while applying
/// a transaction group to the world state.
#[derive(Debug, Error)]
pub enum RuntimeError {
    // =========================
    // Assembly
    // =========================
    /// Program does not start with `#pragma version N`.
    #[error("#pragma version must be the first instruction")]
    PragmaNotAtFirstLine,
    /// Malformed or unsupported pragma version.
    #[error("invalid program version: {found}")]
    PragmaVersionError { found: String },
    /// Wrong number of immediate arguments on an instruction line.
    #[error("expected {expected} immediate argument(s), got {actual}")]
    AssertFieldLength { expected: usize, actual: usize },
    /// Unrecognized opcode mnemonic.
    #[error("unknown opcode: {name}")]
    UnknownOpcode { name: String },
    /// Address literal failed checksum or length validation.
    #[error("invalid address: {addr}")]
    InvalidAddr { addr: String },
    /// Unrecognized encoding tag in a `byte` literal.
    #[error("unknown encoding for byte literal: {tag}")]
    UnknownDecodeType { tag: String },
    /// Asset field name not in the asset parameter or holding field set.
    #[error("unknown asset field: {field}")]
    UnknownAssetField { field: String },
    /// Global field name not in the global field set.
    #[error("unknown global field: {field}")]
    UnknownGlobalField { field: String },
    /// Transaction field name not in the transaction field set.
    #[error("unknown transaction field: {field}")]
    UnknownTxField { field: String },
    /// Opcode requires a newer program version than the pragma declares.
    #[error("opcode {opcode} requires version {required}, program is version {program}")]
    OpcodeVersionError {
        opcode: String,
        required: u64,
        program: u64,
    },

    // =========================
    // Interpreter
    // =========================
    /// Stack value has the wrong type for the consuming opcode.
    #[error("invalid type: expected {expected}, got {actual}")]
    InvalidType {
        expected: &'static str,
        actual: &'static str,
    },
    /// Arithmetic result exceeds the unsigned 64-bit range.
    #[error("uint64 overflow")]
    Uint64Overflow,
    /// Arithmetic result is below zero.
    #[error("uint64 underflow")]
    Uint64Underflow,
    /// Division or modulo by zero.
    #[error("division by zero")]
    ZeroDiv,
    /// Byte value outside the 0..=255 range.
    #[error("value {value} is not a uint8")]
    InvalidUint8 { value: u64 },
    /// `setbit` value must be 0 or 1.
    #[error("setbit value {value} is not a bit")]
    SetBitValueError { value: u64 },
    /// Substring start index is greater than the end index.
    #[error("substring end {end} is before start {start}")]
    SubstringEndBeforeStart { start: u64, end: u64 },
    /// Substring range extends past the end of the byte string.
    #[error("substring end {end} is beyond length {len}")]
    SubstringRangeBeyond { end: u64, len: u64 },
    /// `btoi` input longer than 8 bytes.
    #[error("btoi input of {len} bytes exceeds 8")]
    LongInputError { len: usize },
    /// Concatenation result exceeds the byte-string size bound.
    #[error("concat result of {len} bytes exceeds the 4096 byte limit")]
    ConcatError { len: usize },
    /// Not enough values on the stack for the opcode.
    #[error("stack has {actual} value(s), {required} required")]
    AssertStackLength { required: usize, actual: usize },
    /// Constant block size outside the allowed range.
    #[error("constant block of {actual} entries outside {min}..={max}")]
    AssertArrLength {
        min: usize,
        max: usize,
        actual: usize,
    },
    /// Index past the end of an array (scratch, const block, foreign array).
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBound { index: u64, len: usize },
    /// Immediate argument failed lexical validation.
    #[error("invalid argument {arg} for opcode {opcode}")]
    InvalidOpArg { opcode: String, arg: String },
    /// Terminal stack value is not a uint64.
    #[error("top of stack is {actual}, expected a uint64")]
    InvalidStackElem { actual: &'static str },
    /// Program terminated with a zero or missing verdict.
    #[error("rejected by logic")]
    LogicRejection,
    /// The `err` opcode was executed.
    #[error("err opcode encountered")]
    EncounteredErr,
    /// Field cannot be read this way (reserved field, or scalar accessed as array).
    #[error("invalid access of field {field}")]
    InvalidFieldType { field: String },
    /// Branch target label does not exist in the program.
    #[error("undefined label: {label}")]
    UndefinedLabel { label: String },
    /// Push beyond the maximum stack depth.
    #[error("stack overflow at depth {depth}")]
    StackOverflow { depth: usize },
    /// Opcode not available in the current execution mode.
    #[error("opcode {opcode} is not valid in this execution mode")]
    ExecutionModeError { opcode: String },
    /// Instruction budget exhausted.
    #[error("execution cost exceeds the budget of {budget}")]
    CostBudgetExceeded { budget: u64 },

    // =========================
    // World / engine
    // =========================
    /// Address not present in the world state.
    #[error("account {address} does not exist")]
    AccountDoesNotExist { address: String },
    /// Application id not present in the world state.
    #[error("application {app_id} not found")]
    AppNotFound { app_id: u64 },
    /// Asset id not present in the world state.
    #[error("asset {asset_id} not found")]
    AssetNotFound { asset_id: u64 },
    /// Account has not opted in to the asset.
    #[error("account {address} has not opted in to asset {asset_id}")]
    AsaNotOptin { asset_id: u64, address: String },
    /// Holding is frozen for transfers.
    #[error("asset {asset_id} is frozen for account {address}")]
    AccountAssetFrozen { asset_id: u64, address: String },
    /// Sender is not the asset manager.
    #[error("sender is not the manager of asset {asset_id}")]
    ManagerError { asset_id: u64 },
    /// Sender is not the asset freeze address.
    #[error("sender is not the freeze address of asset {asset_id}")]
    FreezeError { asset_id: u64 },
    /// Sender is not the asset clawback address.
    #[error("sender is not the clawback address of asset {asset_id}")]
    ClawbackError { asset_id: u64 },
    /// Balance would drop below the required amount or the minimum balance.
    #[error("account {address} balance {available} below required {required}")]
    InsufficientAccountBalance {
        address: String,
        required: u64,
        available: u64,
    },
    /// Holding smaller than the transfer amount.
    #[error("holding of asset {asset_id} is {available}, {required} required")]
    InsufficientAccountAssets {
        asset_id: u64,
        required: u64,
        available: u64,
    },
    /// Malformed or inconsistent transaction parameters.
    #[error("invalid transaction parameters: {reason}")]
    InvalidTransactionParams { reason: String },
    /// Current round outside the transaction's validity window.
    #[error("round {round} outside validity window {first}..={last}")]
    InvalidRound { round: u64, first: u64, last: u64 },
    /// Attached program rejected the transaction.
    #[error("transaction rejected by logic")]
    RejectedByLogic,
    /// Transaction requires a logic signature but none was provided.
    #[error("logic signature not found")]
    LogicSignatureNotFound,
    /// Logic signature failed signature or address validation.
    #[error("logic signature validation failed for account {address}")]
    LogicSignatureValidationFailed { address: String },
    /// State write would exceed the declared schema.
    #[error("schema {kind} count exceeds the declared limit of {limit}")]
    SchemaExceeded { kind: &'static str, limit: u64 },
    /// Asset role address transition violates the lock rules.
    #[error("{role} address of asset {asset_id} is locked")]
    RoleAddressLocked {
        role: &'static str,
        asset_id: u64,
    },
    /// Per-account entity count limit reached.
    #[error("limit of {limit} {what} reached")]
    MaxLimitExceeded { what: &'static str, limit: usize },
    /// State key longer than the allowed maximum.
    #[error("state key of {len} bytes exceeds the 64 byte limit")]
    InvalidStateKey { len: usize },

    /// Source-line context wrapper.
    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        source: Box<RuntimeError>,
    },
}

impl RuntimeError {
    /// Stable numeric code for this error kind.
    pub fn code(&self) -> u16 {
        match self {
            RuntimeError::PragmaNotAtFirstLine => 1001,
            RuntimeError::PragmaVersionError { .. } => 1002,
            RuntimeError::AssertFieldLength { .. } => 1003,
            RuntimeError::UnknownOpcode { .. } => 1004,
            RuntimeError::InvalidAddr { .. } => 1005,
            RuntimeError::UnknownDecodeType { .. } => 1006,
            RuntimeError::UnknownAssetField { .. } => 1007,
            RuntimeError::UnknownGlobalField { .. } => 1008,
            RuntimeError::UnknownTxField { .. } => 1009,
            RuntimeError::OpcodeVersionError { .. } => 1010,

            RuntimeError::InvalidType { .. } => 1101,
            RuntimeError::Uint64Overflow => 1102,
            RuntimeError::Uint64Underflow => 1103,
            RuntimeError::ZeroDiv => 1104,
            RuntimeError::InvalidUint8 { .. } => 1105,
            RuntimeError::SetBitValueError { .. } => 1106,
            RuntimeError::SubstringEndBeforeStart { .. } => 1107,
            RuntimeError::SubstringRangeBeyond { .. } => 1108,
            RuntimeError::LongInputError { .. } => 1109,
            RuntimeError::ConcatError { .. } => 1110,
            RuntimeError::AssertStackLength { .. } => 1111,
            RuntimeError::AssertArrLength { .. } => 1112,
            RuntimeError::IndexOutOfBound { .. } => 1113,
            RuntimeError::InvalidOpArg { .. } => 1114,
            RuntimeError::InvalidStackElem { .. } => 1115,
            RuntimeError::LogicRejection => 1116,
            RuntimeError::EncounteredErr => 1117,
            RuntimeError::InvalidFieldType { .. } => 1118,
            RuntimeError::UndefinedLabel { .. } => 1119,
            RuntimeError::StackOverflow { .. } => 1120,
            RuntimeError::ExecutionModeError { .. } => 1121,
            RuntimeError::CostBudgetExceeded { .. } => 1122,

            RuntimeError::AccountDoesNotExist { .. } => 1301,
            RuntimeError::AppNotFound { .. } => 1302,
            RuntimeError::AssetNotFound { .. } => 1303,
            RuntimeError::AsaNotOptin { .. } => 1304,
            RuntimeError::AccountAssetFrozen { .. } => 1305,
            RuntimeError::ManagerError { .. } => 1306,
            RuntimeError::FreezeError { .. } => 1307,
            RuntimeError::ClawbackError { .. } => 1308,
            RuntimeError::InsufficientAccountBalance { .. } => 1309,
            RuntimeError::InsufficientAccountAssets { .. } => 1310,
            RuntimeError::InvalidTransactionParams { .. } => 1311,
            RuntimeError::InvalidRound { .. } => 1312,
            RuntimeError::RejectedByLogic => 1313,
            RuntimeError::LogicSignatureNotFound => 1314,
            RuntimeError::LogicSignatureValidationFailed { .. } => 1315,
            RuntimeError::SchemaExceeded { .. } => 1316,
            RuntimeError::RoleAddressLocked { .. } => 1317,
            RuntimeError::MaxLimitExceeded { .. } => 1318,
            RuntimeError::InvalidStateKey { .. } => 1319,

            RuntimeError::AtLine { source, .. } => source.code(),
        }
    }

    /// Wraps the error with a 1-based source line, unless already wrapped.
    pub fn with_line(self, line: usize) -> RuntimeError {
        match self {
            RuntimeError::AtLine { .. } => self,
            other => RuntimeError::AtLine {
                line,
                source: Box::new(other),
            },
        }
    }

    /// Source line attached to this error, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            RuntimeError::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Unwraps any line context and returns the underlying kind.
    pub fn root(&self) -> &RuntimeError {
        match self {
            RuntimeError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }

    /// True for program-verdict rejections, which the clear-state lifecycle
    /// treats differently from other fatal errors.
    pub fn is_logic_rejection(&self) -> bool {
        matches!(
            self.root(),
            RuntimeError::LogicRejection | RuntimeError::RejectedByLogic
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_grouped_by_origin() {
        assert_eq!(RuntimeError::PragmaNotAtFirstLine.code(), 1001);
        assert_eq!(RuntimeError::Uint64Overflow.code(), 1102);
        assert_eq!(RuntimeError::RejectedByLogic.code(), 1313);
    }

    #[test]
    fn at_line_preserves_code_and_line() {
        let err = RuntimeError::ZeroDiv.with_line(7);
        assert_eq!(err.code(), 1104);
        assert_eq!(err.line(), Some(7));
        assert!(matches!(err.root(), RuntimeError::ZeroDiv));
    }

    #[test]
    fn with_line_does_not_double_wrap() {
        let err = RuntimeError::ZeroDiv.with_line(7).with_line(9);
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn display_interpolates_fields() {
        let err = RuntimeError::InvalidType {
            expected: "uint64",
            actual: "bytes",
        };
        assert_eq!(err.to_string(), "invalid type: expected uint64, got bytes");
        assert_eq!(
            err.with_line(3).to_string(),
            "line 3: invalid type: expected uint64, got bytes"
        );
    }

    #[test]
    fn logic_rejection_detection_sees_through_line_context() {
        assert!(RuntimeError::LogicRejection.with_line(2).is_logic_rejection());
        assert!(RuntimeError::RejectedByLogic.is_logic_rejection());
        assert!(!RuntimeError::EncounteredErr.is_logic_rejection());
    }
}
