//! Arithmetic, comparison, and logic opcode handlers.
//!
//! Binary arithmetic pops two uint64 values (bytes fail the typed pop) and
//! pushes one; overflow, underflow, and division by zero are fatal.
//! Comparisons push 0 or 1.

use crate::errors::RuntimeError;
use crate::interpreter::interpreter::Interpreter;
use crate::types::value::Value;

impl Interpreter<'_> {
    /// Pops the two operands in (a, b) order where `b` was on top.
    fn pop_pair(&mut self) -> Result<(u64, u64), RuntimeError> {
        let b = self.stack.pop_uint64()?;
        let a = self.stack.pop_uint64()?;
        Ok((a, b))
    }

    fn push_uint(&mut self, v: u64) -> Result<(), RuntimeError> {
        self.stack.push(Value::Uint64(v))
    }

    fn push_bool(&mut self, v: bool) -> Result<(), RuntimeError> {
        self.stack.push(Value::from_bool(v))
    }

    pub(crate) fn op_add(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let sum = a.checked_add(b).ok_or(RuntimeError::Uint64Overflow)?;
        self.push_uint(sum)
    }

    pub(crate) fn op_sub(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let diff = a.checked_sub(b).ok_or(RuntimeError::Uint64Underflow)?;
        self.push_uint(diff)
    }

    pub(crate) fn op_mul(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let product = a.checked_mul(b).ok_or(RuntimeError::Uint64Overflow)?;
        self.push_uint(product)
    }

    pub(crate) fn op_div(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let quotient = a.checked_div(b).ok_or(RuntimeError::ZeroDiv)?;
        self.push_uint(quotient)
    }

    pub(crate) fn op_mod(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let remainder = a.checked_rem(b).ok_or(RuntimeError::ZeroDiv)?;
        self.push_uint(remainder)
    }

    pub(crate) fn op_lt(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_bool(a < b)
    }

    pub(crate) fn op_gt(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_bool(a > b)
    }

    pub(crate) fn op_le(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_bool(a <= b)
    }

    pub(crate) fn op_ge(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_bool(a >= b)
    }

    /// `==` and `!=` compare like-typed values; mixing types is fatal.
    fn pop_equal_operands(&mut self) -> Result<bool, RuntimeError> {
        let b = self.stack.pop()?;
        let a = self.stack.pop()?;
        match (&a, &b) {
            (Value::Uint64(x), Value::Uint64(y)) => Ok(x == y),
            (Value::Bytes(x), Value::Bytes(y)) => Ok(x == y),
            _ => Err(RuntimeError::InvalidType {
                expected: a.type_name(),
                actual: b.type_name(),
            }),
        }
    }

    pub(crate) fn op_eq(&mut self) -> Result<(), RuntimeError> {
        let eq = self.pop_equal_operands()?;
        self.push_bool(eq)
    }

    pub(crate) fn op_neq(&mut self) -> Result<(), RuntimeError> {
        let eq = self.pop_equal_operands()?;
        self.push_bool(!eq)
    }

    pub(crate) fn op_and(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_bool(a != 0 && b != 0)
    }

    pub(crate) fn op_or(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_bool(a != 0 || b != 0)
    }

    pub(crate) fn op_not(&mut self) -> Result<(), RuntimeError> {
        let a = self.stack.pop_uint64()?;
        self.push_bool(a == 0)
    }

    pub(crate) fn op_bitand(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_uint(a & b)
    }

    pub(crate) fn op_bitor(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_uint(a | b)
    }

    pub(crate) fn op_bitxor(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        self.push_uint(a ^ b)
    }

    pub(crate) fn op_bitnot(&mut self) -> Result<(), RuntimeError> {
        let a = self.stack.pop_uint64()?;
        self.push_uint(!a)
    }

    /// Pushes (carry, sum): the 65th bit and the wrapped 64-bit sum.
    pub(crate) fn op_addw(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let wide = a as u128 + b as u128;
        self.push_uint((wide >> 64) as u64)?;
        self.push_uint(wide as u64)
    }

    /// Pushes (high, low) words of the 128-bit product.
    pub(crate) fn op_mulw(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let wide = a as u128 * b as u128;
        self.push_uint((wide >> 64) as u64)?;
        self.push_uint(wide as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::interpreter::tests::run_stateless;

    #[test]
    fn basic_arithmetic() {
        assert!(run_stateless("#pragma version 1\nint 2\nint 3\n+\nint 5\n==").is_ok());
        assert!(run_stateless("#pragma version 1\nint 9\nint 4\n-\nint 5\n==").is_ok());
        assert!(run_stateless("#pragma version 1\nint 6\nint 7\n*\nint 42\n==").is_ok());
        assert!(run_stateless("#pragma version 1\nint 17\nint 5\n/\nint 3\n==").is_ok());
        assert!(run_stateless("#pragma version 1\nint 17\nint 5\n%\nint 2\n==").is_ok());
    }

    #[test]
    fn add_overflow_is_fatal() {
        let src = "#pragma version 1\nint 18446744073709551615\nint 1\n+";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::Uint64Overflow
        ));
    }

    #[test]
    fn sub_underflow_is_fatal() {
        let src = "#pragma version 1\nint 0\nint 1\n-";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::Uint64Underflow
        ));
    }

    #[test]
    fn mul_overflow_is_fatal() {
        let src = "#pragma version 1\nint 18446744073709551615\nint 2\n*";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::Uint64Overflow
        ));
    }

    #[test]
    fn division_by_zero_is_fatal() {
        for op in ["/", "%"] {
            let src = format!("#pragma version 1\nint 3\nint 0\n{op}");
            assert!(matches!(
                run_stateless(&src).unwrap_err().root(),
                RuntimeError::ZeroDiv
            ));
        }
    }

    #[test]
    fn arithmetic_on_bytes_is_fatal() {
        let src = "#pragma version 1\nbyte 0x01\nbyte 0x02\n+";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::InvalidType {
                expected: "uint64",
                actual: "bytes"
            }
        ));
    }

    #[test]
    fn comparisons_push_zero_or_one() {
        assert!(run_stateless("#pragma version 1\nint 1\nint 2\n<").is_ok());
        assert!(run_stateless("#pragma version 1\nint 2\nint 1\n>").is_ok());
        assert!(run_stateless("#pragma version 1\nint 2\nint 2\n<=").is_ok());
        assert!(run_stateless("#pragma version 1\nint 2\nint 2\n>=").is_ok());
        assert!(matches!(
            run_stateless("#pragma version 1\nint 2\nint 1\n<")
                .unwrap_err()
                .root(),
            RuntimeError::LogicRejection
        ));
    }

    #[test]
    fn equality_works_on_bytes() {
        assert!(run_stateless("#pragma version 1\nbyte 0x0102\nbyte 0x0102\n==").is_ok());
        assert!(run_stateless("#pragma version 1\nbyte 0x01\nbyte 0x02\n!=").is_ok());
    }

    #[test]
    fn equality_across_types_is_fatal() {
        let src = "#pragma version 1\nint 1\nbyte 0x01\n==";
        assert!(matches!(
            run_stateless(src).unwrap_err().root(),
            RuntimeError::InvalidType { .. }
        ));
    }

    #[test]
    fn logic_ops() {
        assert!(run_stateless("#pragma version 1\nint 5\nint 3\n&&").is_ok());
        assert!(run_stateless("#pragma version 1\nint 0\nint 3\n||").is_ok());
        assert!(run_stateless("#pragma version 1\nint 0\n!").is_ok());
        assert!(matches!(
            run_stateless("#pragma version 1\nint 0\nint 3\n&&")
                .unwrap_err()
                .root(),
            RuntimeError::LogicRejection
        ));
    }

    #[test]
    fn bitwise_ops() {
        assert!(run_stateless("#pragma version 1\nint 12\nint 10\n&\nint 8\n==").is_ok());
        assert!(run_stateless("#pragma version 1\nint 12\nint 10\n|\nint 14\n==").is_ok());
        assert!(run_stateless("#pragma version 1\nint 12\nint 10\n^\nint 6\n==").is_ok());
        assert!(run_stateless(
            "#pragma version 1\nint 0\n~\nint 18446744073709551615\n=="
        )
        .is_ok());
    }

    #[test]
    fn addw_carry_semantics() {
        // MAX + 1 = (carry 1, sum 0)
        let src = "#pragma version 3\n\
                   int 18446744073709551615\nint 1\naddw\n\
                   int 0\n==\nassert\nint 1\n==";
        assert!(run_stateless(src).is_ok());

        // no overflow: (0, a+b)
        let src = "#pragma version 3\nint 2\nint 3\naddw\nint 5\n==\nassert\nint 0\n==";
        assert!(run_stateless(src).is_ok());
    }

    #[test]
    fn mulw_wide_product() {
        // MAX * 2 = high 1, low MAX-1
        let src = "#pragma version 1\n\
                   int 18446744073709551615\nint 2\nmulw\n\
                   int 18446744073709551614\n==\nstore 0\nint 1\n==\nload 0\n&&";
        assert!(run_stateless(src).is_ok());
    }
}
