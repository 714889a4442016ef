//! The stack-machine execution loop.
//!
//! Fetches the instruction at the instruction pointer, advances, and
//! dispatches to the opcode handler (a flat variant match; the handlers live
//! in the `ops_*` modules). Termination: the pointer runs past the end,
//! `return` forces it past the end, or a fatal error unwinds. On successful
//! termination the stack must hold exactly one nonzero uint64, otherwise the
//! program is rejected.

use crate::core::executor::Ctx;
use crate::errors::RuntimeError;
use crate::interpreter::assembler::Program;
use crate::interpreter::opcodes::Op;
use crate::interpreter::stack::Stack;
use crate::interpreter::{
    ExecutionMode, SCRATCH_SIZE, STATEFUL_BUDGET, STATELESS_BUDGET,
};
use crate::types::value::Value;

/// One program execution: instruction pointer, stack, scratch space, and
/// constant blocks, bound to an execution mode and its instruction budget.
pub struct Interpreter<'a> {
    program: &'a Program,
    pub(crate) index: usize,
    pub(crate) stack: Stack,
    pub(crate) scratch: Vec<Value>,
    pub(crate) intcblock: Vec<u64>,
    pub(crate) bytecblock: Vec<Vec<u8>>,
    pub(crate) mode: ExecutionMode,
    pub(crate) args: Vec<Vec<u8>>,
    cost: u64,
    budget: u64,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter for one run of `program`.
    pub fn new(program: &'a Program, mode: ExecutionMode, args: Vec<Vec<u8>>) -> Interpreter<'a> {
        Interpreter {
            program,
            index: 0,
            stack: Stack::new(),
            scratch: vec![Value::Uint64(0); SCRATCH_SIZE],
            intcblock: Vec::new(),
            bytecblock: Vec::new(),
            mode,
            args,
            cost: 0,
            budget: match mode {
                ExecutionMode::Stateless => STATELESS_BUDGET,
                ExecutionMode::Stateful => STATEFUL_BUDGET,
            },
        }
    }

    /// Hash of the running program, for `ed25519verify` domain separation.
    pub(crate) fn program_hash(&self) -> [u8; 32] {
        self.program.hash
    }

    /// Executes the program to completion and applies the acceptance rule.
    pub fn run(&mut self, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        let program = self.program;
        while self.index < program.instrs.len() {
            let instr = &program.instrs[self.index];
            self.index += 1;
            self.cost += 1;
            if self.cost > self.budget {
                return Err(RuntimeError::CostBudgetExceeded {
                    budget: self.budget,
                }
                .with_line(instr.line));
            }
            self.exec(&instr.op, ctx)
                .map_err(|e| e.with_line(instr.line))?;
        }
        self.finish()
    }

    /// Acceptance rule: exactly one value left, and it is a nonzero uint64.
    fn finish(&mut self) -> Result<(), RuntimeError> {
        if self.stack.len() != 1 {
            return Err(RuntimeError::AssertStackLength {
                required: 1,
                actual: self.stack.len(),
            });
        }
        match self.stack.pop()? {
            Value::Uint64(v) if v != 0 => Ok(()),
            Value::Uint64(_) => Err(RuntimeError::LogicRejection),
            Value::Bytes(_) => Err(RuntimeError::InvalidStackElem { actual: "bytes" }),
        }
    }

    /// Dispatches a single instruction.
    fn exec(&mut self, op: &Op, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        match op {
            // arithmetic / comparison / logic
            Op::Add => self.op_add(),
            Op::Sub => self.op_sub(),
            Op::Mul => self.op_mul(),
            Op::Div => self.op_div(),
            Op::Mod => self.op_mod(),
            Op::Lt => self.op_lt(),
            Op::Gt => self.op_gt(),
            Op::Le => self.op_le(),
            Op::Ge => self.op_ge(),
            Op::Eq => self.op_eq(),
            Op::Neq => self.op_neq(),
            Op::And => self.op_and(),
            Op::Or => self.op_or(),
            Op::Not => self.op_not(),
            Op::BitAnd => self.op_bitand(),
            Op::BitOr => self.op_bitor(),
            Op::BitXor => self.op_bitxor(),
            Op::BitNot => self.op_bitnot(),
            Op::Addw => self.op_addw(),
            Op::Mulw => self.op_mulw(),

            // byte strings
            Op::Len => self.op_len(),
            Op::Itob => self.op_itob(),
            Op::Btoi => self.op_btoi(),
            Op::Concat => self.op_concat(),
            Op::Substring { start, end } => self.op_substring(*start, *end),
            Op::Substring3 => self.op_substring3(),

            // hashing & signatures
            Op::Sha256 => self.op_sha256(),
            Op::Keccak256 => self.op_keccak256(),
            Op::Sha512_256 => self.op_sha512_256(),
            Op::Ed25519Verify => self.op_ed25519verify(),

            // constants
            Op::IntcBlock { values } => self.op_intcblock(values),
            Op::Intc { index } => self.op_intc(*index),
            Op::BytecBlock { values } => self.op_bytecblock(values),
            Op::Bytec { index } => self.op_bytec(*index),
            Op::PushInt { value } => self.stack.push(Value::Uint64(*value)),
            Op::PushBytes { value } => self.stack.push(Value::Bytes(value.clone())),
            Op::Arg { index } => self.op_arg(*index),

            // control flow
            Op::Label { .. } => Ok(()),
            Op::Bnz { label } => self.op_bnz(label),
            Op::Bz { label } => self.op_bz(label),
            Op::B { label } => self.branch_to(label),
            Op::Return => self.op_return(),
            Op::Err => Err(RuntimeError::EncounteredErr),
            Op::Assert => self.op_assert(),
            Op::Dup => self.op_dup(),
            Op::Dup2 => self.op_dup2(),
            Op::Pop => self.stack.pop().map(|_| ()),
            Op::Swap => self.stack.swap_top(),
            Op::Dig { depth } => self.op_dig(*depth),
            Op::Select => self.op_select(),

            // bit / byte indexing
            Op::SetBit => self.op_setbit(),
            Op::GetBit => self.op_getbit(),
            Op::SetByte => self.op_setbyte(),
            Op::GetByte => self.op_getbyte(),

            // scratch
            Op::Store { index } => self.op_store(*index),
            Op::Load { index } => self.op_load(*index),

            // transaction & global introspection
            Op::Txn { field } => self.op_txn(*field, ctx),
            Op::Txna { field, index } => self.op_txna(*field, *index, ctx),
            Op::Gtxn { group, field } => self.op_gtxn(*group, *field, ctx),
            Op::Gtxna {
                group,
                field,
                index,
            } => self.op_gtxna(*group, *field, *index, ctx),
            Op::Gtxns { field } => self.op_gtxns(*field, ctx),
            Op::Gtxnsa { field, index } => self.op_gtxnsa(*field, *index, ctx),
            Op::Global { field } => self.op_global(*field, ctx),

            // application & asset state
            Op::AppOptedIn => self.op_app_opted_in(ctx),
            Op::AppLocalGet => self.op_app_local_get(ctx),
            Op::AppLocalGetEx => self.op_app_local_get_ex(ctx),
            Op::AppGlobalGet => self.op_app_global_get(ctx),
            Op::AppGlobalGetEx => self.op_app_global_get_ex(ctx),
            Op::AppLocalPut => self.op_app_local_put(ctx),
            Op::AppGlobalPut => self.op_app_global_put(ctx),
            Op::AppLocalDel => self.op_app_local_del(ctx),
            Op::AppGlobalDel => self.op_app_global_del(ctx),
            Op::Balance => self.op_balance(ctx),
            Op::MinBalance => self.op_min_balance(ctx),
            Op::AssetHoldingGet { field } => self.op_asset_holding_get(*field, ctx),
            Op::AssetParamsGet { field } => self.op_asset_params_get(*field, ctx),
        }
    }

    /// Jumps to a label, resolved by linear scan of the instruction list.
    pub(crate) fn branch_to(&mut self, label: &str) -> Result<(), RuntimeError> {
        self.index = self.program.find_label(label)?;
        Ok(())
    }

    /// Rejects state opcodes outside stateful execution.
    pub(crate) fn assert_stateful(&self, opcode: &str) -> Result<(), RuntimeError> {
        if self.mode != ExecutionMode::Stateful {
            return Err(RuntimeError::ExecutionModeError {
                opcode: opcode.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::transaction::{PayFlags, TxParams};
    use crate::interpreter::assembler::assemble_source;
    use crate::ledger::account::Account;
    use crate::ledger::world::WorldState;
    use crate::types::address::Address;

    /// Assembles and runs a stateless program against a minimal context.
    pub(crate) fn run_stateless(src: &str) -> Result<(), RuntimeError> {
        run_stateless_with_args(src, vec![])
    }

    pub(crate) fn run_stateless_with_args(
        src: &str,
        args: Vec<Vec<u8>>,
    ) -> Result<(), RuntimeError> {
        let program = assemble_source(src)?;
        let mut ctx = test_ctx();
        let mut interpreter = Interpreter::new(&program, ExecutionMode::Stateless, args);
        interpreter.run(&mut ctx)
    }

    pub(crate) fn test_ctx() -> Ctx {
        let sender = Address([1; 32]);
        let mut world = WorldState::new();
        world.insert_account(Account::new(sender, 1_000_000));
        world.insert_account(Account::new(Address([2; 32]), 1_000_000));
        let tx = TxParams::TransferAlgo {
            from: sender,
            to: Address([2; 32]),
            amount: 100,
        }
        .to_encoded(&PayFlags::default());
        Ctx::new(world, vec![tx])
    }

    #[test]
    fn accepts_single_nonzero_uint() {
        assert!(run_stateless("#pragma version 1\nint 1").is_ok());
        assert!(run_stateless("#pragma version 1\nint 7").is_ok());
    }

    #[test]
    fn rejects_zero_verdict() {
        assert!(matches!(
            run_stateless("#pragma version 1\nint 0").unwrap_err().root(),
            RuntimeError::LogicRejection
        ));
    }

    #[test]
    fn rejects_bytes_verdict() {
        assert!(matches!(
            run_stateless("#pragma version 1\nbyte 0x01")
                .unwrap_err()
                .root(),
            RuntimeError::InvalidStackElem { actual: "bytes" }
        ));
    }

    #[test]
    fn rejects_wrong_final_stack_size() {
        let err = run_stateless("#pragma version 1\nint 1\nint 2").unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::AssertStackLength {
                required: 1,
                actual: 2
            }
        ));

        let err = run_stateless("#pragma version 1\nint 1\npop").unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::AssertStackLength {
                required: 1,
                actual: 0
            }
        ));
    }

    #[test]
    fn err_opcode_rejects_with_line() {
        let err = run_stateless("#pragma version 1\nint 1\nerr").unwrap_err();
        assert_eq!(err.line(), Some(3));
        assert!(matches!(err.root(), RuntimeError::EncounteredErr));
    }

    #[test]
    fn branch_skips_err() {
        let src = "#pragma version 2\nint 1\nbnz ok\nerr\nok:\nint 1";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn branch_not_taken_falls_through() {
        let src = "#pragma version 2\nint 0\nbnz skip\nint 1\nb done\nskip:\nerr\ndone:";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn backward_branch_and_budget() {
        // an infinite loop must be stopped by the instruction budget
        let src = "#pragma version 2\nloop:\nb loop";
        let err = run_stateless(src).unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::CostBudgetExceeded { budget } if *budget == STATELESS_BUDGET
        ));
    }

    #[test]
    fn jump_to_missing_label_fails_at_jump_time() {
        // assembly succeeds, the failure is at execution
        let src = "#pragma version 2\nint 0\nbnz nowhere\nint 1";
        assert!(run_stateless(src).is_ok());

        let src = "#pragma version 2\nint 1\nbnz nowhere\nint 1";
        let err = run_stateless(src).unwrap_err();
        assert!(matches!(err.root(), RuntimeError::UndefinedLabel { .. }));
    }

    #[test]
    fn return_discards_remaining_stack() {
        let src = "#pragma version 2\nint 1\nint 2\nint 3\nreturn";
        assert!(run_stateless(src).is_ok());

        let src = "#pragma version 2\nint 1\nint 0\nreturn";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::LogicRejection
        ));
    }

    #[test]
    fn scratch_defaults_to_zero_uint() {
        // an unwritten slot loads Uint64(0)
        let src = "#pragma version 1\nload 42\nint 0\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn store_load_roundtrip() {
        let src = "#pragma version 1\nint 99\nstore 7\nload 7\nint 99\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn stateless_mode_rejects_app_state_opcodes() {
        let src = "#pragma version 2\nint 0\nbalance";
        let err = run_stateless(src).unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::ExecutionModeError { .. }
        ));
    }

    #[test]
    fn arg_reads_program_arguments() {
        let src = "#pragma version 1\narg 1\nbtoi";
        let args = vec![vec![0], vec![0, 0, 0, 0, 0, 0, 0, 5]];
        assert!(run_stateless_with_args(src, args).is_ok());
    }

    #[test]
    fn arg_out_of_range_fails() {
        let err = run_stateless("#pragma version 1\narg 0").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::IndexOutOfBound { .. }));
    }
}
