//! Control-flow, constant-block, scratch, and stack-shuffling handlers.

use crate::errors::RuntimeError;
use crate::interpreter::interpreter::Interpreter;
use crate::types::value::Value;

impl Interpreter<'_> {
    /// Replaces the integer constant block for this execution.
    pub(crate) fn op_intcblock(&mut self, values: &[u64]) -> Result<(), RuntimeError> {
        self.intcblock = values.to_vec();
        Ok(())
    }

    pub(crate) fn op_intc(&mut self, index: usize) -> Result<(), RuntimeError> {
        let value = *self
            .intcblock
            .get(index)
            .ok_or(RuntimeError::IndexOutOfBound {
                index: index as u64,
                len: self.intcblock.len(),
            })?;
        self.stack.push(Value::Uint64(value))
    }

    /// Replaces the byte constant block for this execution.
    pub(crate) fn op_bytecblock(&mut self, values: &[Vec<u8>]) -> Result<(), RuntimeError> {
        self.bytecblock = values.to_vec();
        Ok(())
    }

    pub(crate) fn op_bytec(&mut self, index: usize) -> Result<(), RuntimeError> {
        let value = self
            .bytecblock
            .get(index)
            .ok_or(RuntimeError::IndexOutOfBound {
                index: index as u64,
                len: self.bytecblock.len(),
            })?
            .clone();
        self.stack.push(Value::Bytes(value))
    }

    /// Pushes the logic-signature argument at `index` (stateless mode only).
    pub(crate) fn op_arg(&mut self, index: usize) -> Result<(), RuntimeError> {
        if self.mode != crate::interpreter::ExecutionMode::Stateless {
            return Err(RuntimeError::ExecutionModeError {
                opcode: "arg".to_string(),
            });
        }
        let value = self
            .args
            .get(index)
            .ok_or(RuntimeError::IndexOutOfBound {
                index: index as u64,
                len: self.args.len(),
            })?
            .clone();
        self.stack.push(Value::Bytes(value))
    }

    pub(crate) fn op_bnz(&mut self, label: &str) -> Result<(), RuntimeError> {
        let condition = self.stack.pop_uint64()?;
        if condition != 0 {
            self.branch_to(label)?;
        }
        Ok(())
    }

    pub(crate) fn op_bz(&mut self, label: &str) -> Result<(), RuntimeError> {
        let condition = self.stack.pop_uint64()?;
        if condition == 0 {
            self.branch_to(label)?;
        }
        Ok(())
    }

    /// Keeps the top value as the verdict, discards the rest of the stack,
    /// and moves the instruction pointer past the end of the program.
    pub(crate) fn op_return(&mut self) -> Result<(), RuntimeError> {
        let verdict = self.stack.pop()?;
        self.stack.clear();
        self.stack.push(verdict)?;
        self.index = usize::MAX;
        Ok(())
    }

    pub(crate) fn op_assert(&mut self) -> Result<(), RuntimeError> {
        let condition = self.stack.pop_uint64()?;
        if condition == 0 {
            return Err(RuntimeError::LogicRejection);
        }
        Ok(())
    }

    pub(crate) fn op_dup(&mut self) -> Result<(), RuntimeError> {
        let top = self.stack.peek(0)?.clone();
        self.stack.push(top)
    }

    pub(crate) fn op_dup2(&mut self) -> Result<(), RuntimeError> {
        let below = self.stack.peek(1)?.clone();
        let top = self.stack.peek(0)?.clone();
        self.stack.push(below)?;
        self.stack.push(top)
    }

    /// Duplicates the value `depth` entries below the top.
    pub(crate) fn op_dig(&mut self, depth: u64) -> Result<(), RuntimeError> {
        let value = self.stack.peek(depth as usize)?.clone();
        self.stack.push(value)
    }

    /// (A, B, C) → C nonzero ? B : A.
    pub(crate) fn op_select(&mut self) -> Result<(), RuntimeError> {
        let c = self.stack.pop_uint64()?;
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        self.stack.push(if c != 0 { b } else { a })
    }

    pub(crate) fn op_store(&mut self, index: usize) -> Result<(), RuntimeError> {
        let value = self.stack.pop()?;
        self.scratch[index] = value;
        Ok(())
    }

    pub(crate) fn op_load(&mut self, index: usize) -> Result<(), RuntimeError> {
        let value = self.scratch[index].clone();
        self.stack.push(value)
    }
}
