//! Transaction and global introspection handlers.

use crate::core::executor::Ctx;
use crate::core::{MAX_TXN_LIFE, MIN_TXN_FEE};
use crate::errors::RuntimeError;
use crate::interpreter::fields::{
    resolve_tx_array_field, resolve_tx_field, GlobalField, TxField,
};
use crate::interpreter::interpreter::Interpreter;
use crate::interpreter::MAX_PROGRAM_VERSION;
use crate::ledger::BASE_MIN_BALANCE;
use crate::types::address::Address;
use crate::types::value::Value;

impl Interpreter<'_> {
    pub(crate) fn op_txn(&mut self, field: TxField, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        let value = resolve_tx_field(ctx.tx(), field)?;
        self.stack.push(value)
    }

    pub(crate) fn op_txna(
        &mut self,
        field: TxField,
        index: u64,
        ctx: &mut Ctx,
    ) -> Result<(), RuntimeError> {
        let value = resolve_tx_array_field(ctx.tx(), field, index)?;
        self.stack.push(value)
    }

    fn group_tx<'c>(&self, ctx: &'c Ctx, group: usize) -> Result<&'c crate::core::transaction::EncodedTx, RuntimeError> {
        ctx.group()
            .get(group)
            .ok_or(RuntimeError::IndexOutOfBound {
                index: group as u64,
                len: ctx.group().len(),
            })
    }

    pub(crate) fn op_gtxn(
        &mut self,
        group: usize,
        field: TxField,
        ctx: &mut Ctx,
    ) -> Result<(), RuntimeError> {
        let value = resolve_tx_field(self.group_tx(ctx, group)?, field)?;
        self.stack.push(value)
    }

    pub(crate) fn op_gtxna(
        &mut self,
        group: usize,
        field: TxField,
        index: u64,
        ctx: &mut Ctx,
    ) -> Result<(), RuntimeError> {
        let value = resolve_tx_array_field(self.group_tx(ctx, group)?, field, index)?;
        self.stack.push(value)
    }

    /// Like `gtxn`, with the group index popped from the stack.
    pub(crate) fn op_gtxns(&mut self, field: TxField, ctx: &mut Ctx) -> Result<(), RuntimeError> {
        let group = self.stack.pop_uint64()? as usize;
        self.op_gtxn(group, field, ctx)
    }

    /// Like `gtxna`, with the group index popped from the stack.
    pub(crate) fn op_gtxnsa(
        &mut self,
        field: TxField,
        index: u64,
        ctx: &mut Ctx,
    ) -> Result<(), RuntimeError> {
        let group = self.stack.pop_uint64()? as usize;
        self.op_gtxna(group, field, index, ctx)
    }

    pub(crate) fn op_global(
        &mut self,
        field: GlobalField,
        ctx: &mut Ctx,
    ) -> Result<(), RuntimeError> {
        let value = match field {
            GlobalField::MinTxnFee => Value::Uint64(MIN_TXN_FEE),
            GlobalField::MinBalance => Value::Uint64(BASE_MIN_BALANCE),
            GlobalField::MaxTxnLife => Value::Uint64(MAX_TXN_LIFE),
            GlobalField::ZeroAddress => Value::Bytes(Address::zero().to_vec()),
            GlobalField::GroupSize => Value::Uint64(ctx.group().len() as u64),
            GlobalField::LogicSigVersion => Value::Uint64(MAX_PROGRAM_VERSION),
            GlobalField::Round => Value::Uint64(ctx.state.round),
            GlobalField::LatestTimestamp => Value::Uint64(ctx.state.timestamp),
            GlobalField::CurrentApplicationID => {
                self.assert_stateful("global CurrentApplicationID")?;
                Value::Uint64(ctx.app_id)
            }
            GlobalField::CreatorAddress => {
                self.assert_stateful("global CreatorAddress")?;
                let creator = ctx.state.app_creator(ctx.app_id)?;
                Value::Bytes(creator.to_vec())
            }
        };
        self.stack.push(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::Ctx;
    use crate::core::transaction::{PayFlags, TxParams};
    use crate::interpreter::assembler::assemble_source;
    use crate::interpreter::interpreter::tests::run_stateless;
    use crate::interpreter::interpreter::Interpreter;
    use crate::interpreter::ExecutionMode;
    use crate::ledger::account::Account;
    use crate::ledger::world::WorldState;

    fn group_ctx() -> Ctx {
        let a = Address([1; 32]);
        let b = Address([2; 32]);
        let mut world = WorldState::new();
        world.insert_account(Account::new(a, 1_000_000));
        world.insert_account(Account::new(b, 1_000_000));
        let mut txs = vec![
            TxParams::TransferAlgo {
                from: a,
                to: b,
                amount: 100,
            }
            .to_encoded(&PayFlags::default()),
            TxParams::TransferAlgo {
                from: b,
                to: a,
                amount: 200,
            }
            .to_encoded(&PayFlags::default()),
        ];
        crate::core::transaction::assign_group_id(&mut txs);
        Ctx::new(world, txs)
    }

    fn run_in_group(src: &str, mut ctx: Ctx) -> Result<(), RuntimeError> {
        let program = assemble_source(src).unwrap();
        let mut interpreter = Interpreter::new(&program, ExecutionMode::Stateless, vec![]);
        interpreter.run(&mut ctx)
    }

    #[test]
    fn txn_reads_current_transaction() {
        assert!(run_stateless("#pragma version 1\ntxn Amount\nint 100\n==").is_ok());
        assert!(run_stateless("#pragma version 1\ntxn TypeEnum\nint 1\n==").is_ok());
        assert!(run_stateless("#pragma version 1\ntxn Sender\nlen\nint 32\n==").is_ok());
    }

    #[test]
    fn txn_first_valid_time_rejects() {
        let err = run_stateless("#pragma version 1\ntxn FirstValidTime").unwrap_err();
        assert!(matches!(err.root(), RuntimeError::InvalidFieldType { .. }));
    }

    #[test]
    fn gtxn_reads_other_group_members() {
        let src = "#pragma version 1\ngtxn 1 Amount\nint 200\n==";
        assert!(run_in_group(src, group_ctx()).is_ok());
    }

    #[test]
    fn gtxn_out_of_group_bounds() {
        let src = "#pragma version 1\ngtxn 2 Amount";
        let err = run_in_group(src, group_ctx()).unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::IndexOutOfBound { index: 2, len: 2 }
        ));
    }

    #[test]
    fn gtxns_pops_group_index() {
        let src = "#pragma version 3\nint 1\ngtxns Amount\nint 200\n==";
        assert!(run_in_group(src, group_ctx()).is_ok());
    }

    #[test]
    fn group_index_field_matches_position() {
        let src = "#pragma version 1\ngtxn 1 GroupIndex\nint 1\n==";
        assert!(run_in_group(src, group_ctx()).is_ok());
    }

    #[test]
    fn globals_resolve() {
        assert!(run_stateless("#pragma version 2\nglobal MinTxnFee\nint 1000\n==").is_ok());
        assert!(run_stateless("#pragma version 2\nglobal MinBalance\nint 10000\n==").is_ok());
        assert!(run_stateless("#pragma version 2\nglobal MaxTxnLife\nint 1000\n==").is_ok());
        assert!(run_stateless("#pragma version 2\nglobal ZeroAddress\nlen\nint 32\n==").is_ok());
        assert!(run_stateless("#pragma version 2\nglobal GroupSize\nint 1\n==").is_ok());
        assert!(run_stateless("#pragma version 2\nglobal Round\nint 1\n==").is_ok());
        assert!(run_stateless("#pragma version 2\nglobal LatestTimestamp\nint 1\n==").is_ok());
    }

    #[test]
    fn current_application_id_requires_stateful_mode() {
        let err =
            run_stateless("#pragma version 2\nglobal CurrentApplicationID").unwrap_err();
        assert!(matches!(
            err.root(),
            RuntimeError::ExecutionModeError { .. }
        ));
    }
}
