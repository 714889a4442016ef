//! Program source parser and instruction-list builder.
//!
//! Converts SCL source text into an ordered [`Op`] list. One instruction per
//! non-empty, non-comment line; the first instruction must be
//! `#pragma version N`. Each opcode constructor validates its immediate
//! count and lexical form here, so execution never sees malformed
//! immediates. Opcodes from a newer language version than the pragma
//! declares reject at assembly.
//!
//! # Syntax
//!
//! ```text
//! #pragma version 2
//! int 1            // push a constant
//! bnz done         // branch to a label
//! done:
//! ```
//!
//! - labels are identifiers suffixed by `:` on their own line
//! - `byte` accepts `0xHEX`, `"literal"`, `base64 PAYLOAD`, `base32 PAYLOAD`
//! - `addr` decodes a checksummed address literal to its raw 32 bytes

use crate::crypto::logic_sig::program_hash;
use crate::errors::RuntimeError;
use crate::interpreter::fields::{AssetHoldingField, AssetParamsField, GlobalField, TxField};
use crate::interpreter::lexer::{tokenize, Token};
use crate::interpreter::opcodes::{min_version, Op};
use crate::interpreter::{MAX_CONST_BLOCK, MAX_PROGRAM_VERSION, SCRATCH_SIZE};
use crate::types::address::Address;
use crate::types::value::MAX_BYTES_LEN;
use base64::Engine;
use data_encoding::BASE32_NOPAD;

const LABEL_SUFFIX: char = ':';
const PRAGMA: &str = "#pragma";

/// One instruction with the source line it came from.
#[derive(Clone, Debug)]
pub struct Instr {
    pub op: Op,
    pub line: usize,
}

/// An assembled program: declared version, instruction list, and the
/// program hash used for `ed25519verify` domain separation.
#[derive(Clone, Debug)]
pub struct Program {
    pub version: u64,
    pub instrs: Vec<Instr>,
    pub hash: [u8; 32],
}

impl Program {
    /// Finds the instruction index of a label by linear scan.
    pub fn find_label(&self, name: &str) -> Result<usize, RuntimeError> {
        self.instrs
            .iter()
            .position(|instr| matches!(&instr.op, Op::Label { name: n } if n == name))
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                label: name.to_string(),
            })
    }
}

/// Assembles a full source string into a [`Program`].
pub fn assemble_source(source: &str) -> Result<Program, RuntimeError> {
    let hash = program_hash(source);
    let mut version: Option<u64> = None;
    let mut instrs: Vec<Instr> = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let tokens = tokenize(line_no, line)?;
        if tokens.is_empty() {
            continue;
        }

        if tokens[0].text == PRAGMA {
            if version.is_some() || !instrs.is_empty() {
                return Err(RuntimeError::PragmaNotAtFirstLine.with_line(line_no));
            }
            version = Some(parse_pragma(&tokens).map_err(|e| e.with_line(line_no))?);
            continue;
        }

        let program_version = version
            .ok_or(RuntimeError::PragmaNotAtFirstLine)
            .map_err(|e| e.with_line(line_no))?;

        if is_label_def(tokens[0].text) {
            if tokens.len() > 1 {
                return Err(RuntimeError::AssertFieldLength {
                    expected: 0,
                    actual: tokens.len() - 1,
                }
                .with_line(line_no));
            }
            instrs.push(Instr {
                op: Op::Label {
                    name: label_name(tokens[0].text).to_string(),
                },
                line: line_no,
            });
            continue;
        }

        let op = parse_instruction(&tokens, program_version).map_err(|e| e.with_line(line_no))?;
        instrs.push(Instr { op, line: line_no });
    }

    let version = version.ok_or(RuntimeError::PragmaNotAtFirstLine)?;
    Ok(Program {
        version,
        instrs,
        hash,
    })
}

/// Parses `#pragma version N`.
fn parse_pragma(tokens: &[Token]) -> Result<u64, RuntimeError> {
    let found = || RuntimeError::PragmaVersionError {
        found: tokens
            .iter()
            .map(|t| t.text)
            .collect::<Vec<_>>()
            .join(" "),
    };
    if tokens.len() != 3 || tokens[1].text != "version" {
        return Err(found());
    }
    let version: u64 = tokens[2].text.parse().map_err(|_| found())?;
    if version == 0 || version > MAX_PROGRAM_VERSION {
        return Err(found());
    }
    Ok(version)
}

/// Checks if a token is a label definition (ends with `:`).
fn is_label_def(tok: &str) -> bool {
    tok.ends_with(LABEL_SUFFIX) && tok.len() > 1
}

/// Extracts the label name from a label definition token.
fn label_name(tok: &str) -> &str {
    &tok[..tok.len() - 1]
}

/// Fails unless exactly `expected` immediate arguments are present.
fn expect_args(tokens: &[Token], expected: usize) -> Result<(), RuntimeError> {
    if tokens.len() - 1 != expected {
        return Err(RuntimeError::AssertFieldLength {
            expected,
            actual: tokens.len() - 1,
        });
    }
    Ok(())
}

/// Parses a digits-only u64 immediate.
pub(crate) fn parse_u64(opcode: &str, tok: &str) -> Result<u64, RuntimeError> {
    if tok.is_empty() || !tok.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RuntimeError::InvalidOpArg {
            opcode: opcode.to_string(),
            arg: tok.to_string(),
        });
    }
    tok.parse().map_err(|_| RuntimeError::InvalidOpArg {
        opcode: opcode.to_string(),
        arg: tok.to_string(),
    })
}

/// Parses an index immediate bounded by `len`.
fn parse_index(opcode: &str, tok: &str, len: usize) -> Result<usize, RuntimeError> {
    let index = parse_u64(opcode, tok)?;
    if index >= len as u64 {
        return Err(RuntimeError::IndexOutOfBound { index, len });
    }
    Ok(index as usize)
}

/// Parses an `int` literal: digits, a transaction-type name, or an
/// on-completion name.
fn parse_int_literal(tok: &str) -> Result<u64, RuntimeError> {
    let named = match tok {
        "pay" => Some(1),
        "keyreg" => Some(2),
        "acfg" => Some(3),
        "axfer" => Some(4),
        "afrz" => Some(5),
        "appl" => Some(6),
        "NoOp" => Some(0),
        "OptIn" => Some(1),
        "CloseOut" => Some(2),
        "ClearState" => Some(3),
        "UpdateApplication" => Some(4),
        "DeleteApplication" => Some(5),
        _ => None,
    };
    match named {
        Some(v) => Ok(v),
        None => parse_u64("int", tok),
    }
}

/// Strips the surrounding quotes from a string-literal token, if present.
fn quoted_payload(tok: &str) -> Option<&str> {
    tok.strip_prefix('"')?.strip_suffix('"')
}

/// Decodes a `byte`-style literal from the argument tokens.
///
/// Accepted forms: `0xHEX`, `"utf-8 literal"`, `base64 PAYLOAD`,
/// `b64 PAYLOAD`, `base32 PAYLOAD`, `b32 PAYLOAD` (payload optionally
/// quoted).
pub(crate) fn parse_byte_literal(opcode: &str, args: &[&str]) -> Result<Vec<u8>, RuntimeError> {
    let invalid = |arg: &str| RuntimeError::InvalidOpArg {
        opcode: opcode.to_string(),
        arg: arg.to_string(),
    };

    let bytes = match args {
        [single] => {
            if let Some(hex_payload) = single.strip_prefix("0x") {
                hex::decode(hex_payload).map_err(|_| invalid(single))?
            } else if let Some(literal) = quoted_payload(single) {
                literal.as_bytes().to_vec()
            } else {
                return Err(RuntimeError::UnknownDecodeType {
                    tag: single.to_string(),
                });
            }
        }
        [tag, payload] => {
            let payload = quoted_payload(payload).unwrap_or(*payload);
            match *tag {
                "base64" | "b64" => base64::engine::general_purpose::STANDARD
                    .decode(payload)
                    .map_err(|_| invalid(payload))?,
                "base32" | "b32" => BASE32_NOPAD
                    .decode(payload.as_bytes())
                    .map_err(|_| invalid(payload))?,
                other => {
                    return Err(RuntimeError::UnknownDecodeType {
                        tag: other.to_string(),
                    })
                }
            }
        }
        _ => {
            return Err(RuntimeError::AssertFieldLength {
                expected: 1,
                actual: args.len(),
            })
        }
    };

    if bytes.len() > MAX_BYTES_LEN {
        return Err(invalid("literal exceeds the byte-string size bound"));
    }
    Ok(bytes)
}

/// Parses one instruction line into an [`Op`], enforcing version gating and
/// immediate validation.
fn parse_instruction(tokens: &[Token], version: u64) -> Result<Op, RuntimeError> {
    let name = tokens[0].text;
    let required = min_version(name).ok_or_else(|| RuntimeError::UnknownOpcode {
        name: name.to_string(),
    })?;
    if required > version {
        return Err(RuntimeError::OpcodeVersionError {
            opcode: name.to_string(),
            required,
            program: version,
        });
    }

    let args: Vec<&str> = tokens[1..].iter().map(|t| t.text).collect();

    let op = match name {
        "+" => no_args(tokens, Op::Add)?,
        "-" => no_args(tokens, Op::Sub)?,
        "*" => no_args(tokens, Op::Mul)?,
        "/" => no_args(tokens, Op::Div)?,
        "%" => no_args(tokens, Op::Mod)?,
        "<" => no_args(tokens, Op::Lt)?,
        ">" => no_args(tokens, Op::Gt)?,
        "<=" => no_args(tokens, Op::Le)?,
        ">=" => no_args(tokens, Op::Ge)?,
        "==" => no_args(tokens, Op::Eq)?,
        "!=" => no_args(tokens, Op::Neq)?,
        "&&" => no_args(tokens, Op::And)?,
        "||" => no_args(tokens, Op::Or)?,
        "!" => no_args(tokens, Op::Not)?,
        "&" => no_args(tokens, Op::BitAnd)?,
        "|" => no_args(tokens, Op::BitOr)?,
        "^" => no_args(tokens, Op::BitXor)?,
        "~" => no_args(tokens, Op::BitNot)?,
        "addw" => no_args(tokens, Op::Addw)?,
        "mulw" => no_args(tokens, Op::Mulw)?,

        "len" => no_args(tokens, Op::Len)?,
        "itob" => no_args(tokens, Op::Itob)?,
        "btoi" => no_args(tokens, Op::Btoi)?,
        "concat" => no_args(tokens, Op::Concat)?,
        "substring" => {
            expect_args(tokens, 2)?;
            Op::Substring {
                start: parse_u64(name, args[0])?,
                end: parse_u64(name, args[1])?,
            }
        }
        "substring3" => no_args(tokens, Op::Substring3)?,

        "sha256" => no_args(tokens, Op::Sha256)?,
        "keccak256" => no_args(tokens, Op::Keccak256)?,
        "sha512_256" => no_args(tokens, Op::Sha512_256)?,
        "ed25519verify" => no_args(tokens, Op::Ed25519Verify)?,

        "intcblock" => {
            let values = args
                .iter()
                .map(|tok| parse_u64(name, tok))
                .collect::<Result<Vec<u64>, _>>()?;
            assert_const_block(values.len())?;
            Op::IntcBlock { values }
        }
        "intc" => {
            expect_args(tokens, 1)?;
            Op::Intc {
                index: parse_index(name, args[0], MAX_CONST_BLOCK)?,
            }
        }
        "intc_0" | "intc_1" | "intc_2" | "intc_3" => {
            expect_args(tokens, 0)?;
            Op::Intc {
                index: (name.as_bytes()[5] - b'0') as usize,
            }
        }
        "bytecblock" => {
            let values = args
                .iter()
                .map(|tok| parse_byte_literal(name, &[tok]))
                .collect::<Result<Vec<Vec<u8>>, _>>()?;
            assert_const_block(values.len())?;
            Op::BytecBlock { values }
        }
        "bytec" => {
            expect_args(tokens, 1)?;
            Op::Bytec {
                index: parse_index(name, args[0], MAX_CONST_BLOCK)?,
            }
        }
        "bytec_0" | "bytec_1" | "bytec_2" | "bytec_3" => {
            expect_args(tokens, 0)?;
            Op::Bytec {
                index: (name.as_bytes()[6] - b'0') as usize,
            }
        }
        "pushint" | "int" => {
            expect_args(tokens, 1)?;
            Op::PushInt {
                value: parse_int_literal(args[0])?,
            }
        }
        "pushbytes" | "byte" => Op::PushBytes {
            value: parse_byte_literal(name, &args)?,
        },
        "addr" => {
            expect_args(tokens, 1)?;
            Op::PushBytes {
                value: Address::decode(args[0])?.to_vec(),
            }
        }
        "arg" => {
            expect_args(tokens, 1)?;
            Op::Arg {
                index: parse_u64(name, args[0])? as usize,
            }
        }

        "bnz" | "bz" | "b" => {
            expect_args(tokens, 1)?;
            let label = args[0].to_string();
            match name {
                "bnz" => Op::Bnz { label },
                "bz" => Op::Bz { label },
                _ => Op::B { label },
            }
        }
        "return" => no_args(tokens, Op::Return)?,
        "err" => no_args(tokens, Op::Err)?,
        "assert" => no_args(tokens, Op::Assert)?,
        "dup" => no_args(tokens, Op::Dup)?,
        "dup2" => no_args(tokens, Op::Dup2)?,
        "pop" => no_args(tokens, Op::Pop)?,
        "swap" => no_args(tokens, Op::Swap)?,
        "dig" => {
            expect_args(tokens, 1)?;
            Op::Dig {
                depth: parse_u64(name, args[0])?,
            }
        }
        "select" => no_args(tokens, Op::Select)?,

        "setbit" => no_args(tokens, Op::SetBit)?,
        "getbit" => no_args(tokens, Op::GetBit)?,
        "setbyte" => no_args(tokens, Op::SetByte)?,
        "getbyte" => no_args(tokens, Op::GetByte)?,

        "store" => {
            expect_args(tokens, 1)?;
            Op::Store {
                index: parse_index(name, args[0], SCRATCH_SIZE)?,
            }
        }
        "load" => {
            expect_args(tokens, 1)?;
            Op::Load {
                index: parse_index(name, args[0], SCRATCH_SIZE)?,
            }
        }

        "txn" => {
            expect_args(tokens, 1)?;
            Op::Txn {
                field: scalar_field(args[0], version)?,
            }
        }
        "txna" => {
            expect_args(tokens, 2)?;
            Op::Txna {
                field: array_field(args[0], version)?,
                index: parse_u64(name, args[1])?,
            }
        }
        "gtxn" => {
            expect_args(tokens, 2)?;
            Op::Gtxn {
                group: parse_index(name, args[0], crate::core::MAX_GROUP_SIZE)?,
                field: scalar_field(args[1], version)?,
            }
        }
        "gtxna" => {
            expect_args(tokens, 3)?;
            Op::Gtxna {
                group: parse_index(name, args[0], crate::core::MAX_GROUP_SIZE)?,
                field: array_field(args[1], version)?,
                index: parse_u64(name, args[2])?,
            }
        }
        "gtxns" => {
            expect_args(tokens, 1)?;
            Op::Gtxns {
                field: scalar_field(args[0], version)?,
            }
        }
        "gtxnsa" => {
            expect_args(tokens, 2)?;
            Op::Gtxnsa {
                field: array_field(args[0], version)?,
                index: parse_u64(name, args[1])?,
            }
        }
        "global" => {
            expect_args(tokens, 1)?;
            Op::Global {
                field: GlobalField::parse(args[0], version)?,
            }
        }

        "app_opted_in" => no_args(tokens, Op::AppOptedIn)?,
        "app_local_get" => no_args(tokens, Op::AppLocalGet)?,
        "app_local_get_ex" => no_args(tokens, Op::AppLocalGetEx)?,
        "app_global_get" => no_args(tokens, Op::AppGlobalGet)?,
        "app_global_get_ex" => no_args(tokens, Op::AppGlobalGetEx)?,
        "app_local_put" => no_args(tokens, Op::AppLocalPut)?,
        "app_global_put" => no_args(tokens, Op::AppGlobalPut)?,
        "app_local_del" => no_args(tokens, Op::AppLocalDel)?,
        "app_global_del" => no_args(tokens, Op::AppGlobalDel)?,
        "balance" => no_args(tokens, Op::Balance)?,
        "min_balance" => no_args(tokens, Op::MinBalance)?,
        "asset_holding_get" => {
            expect_args(tokens, 1)?;
            Op::AssetHoldingGet {
                field: AssetHoldingField::parse(args[0])?,
            }
        }
        "asset_params_get" => {
            expect_args(tokens, 1)?;
            Op::AssetParamsGet {
                field: AssetParamsField::parse(args[0])?,
            }
        }

        // unreachable: the version table and this match cover the same names
        other => {
            return Err(RuntimeError::UnknownOpcode {
                name: other.to_string(),
            })
        }
    };

    Ok(op)
}

fn no_args(tokens: &[Token], op: Op) -> Result<Op, RuntimeError> {
    expect_args(tokens, 0)?;
    Ok(op)
}

fn assert_const_block(actual: usize) -> Result<(), RuntimeError> {
    if actual == 0 || actual > MAX_CONST_BLOCK {
        return Err(RuntimeError::AssertArrLength {
            min: 1,
            max: MAX_CONST_BLOCK,
            actual,
        });
    }
    Ok(())
}

fn scalar_field(name: &str, version: u64) -> Result<TxField, RuntimeError> {
    let field = TxField::parse(name, version)?;
    if field.is_array() {
        return Err(RuntimeError::InvalidFieldType {
            field: name.to_string(),
        });
    }
    Ok(field)
}

fn array_field(name: &str, version: u64) -> Result<TxField, RuntimeError> {
    let field = TxField::parse(name, version)?;
    if !field.is_array() {
        return Err(RuntimeError::InvalidFieldType {
            field: name.to_string(),
        });
    }
    Ok(field)
}
