//! ALU logical and comparison operations.
//!
//! Implements bitwise OR, AND, XOR, and set-less-than (signed and unsigned).
//! Comparisons produce 0 or 1.

use crate::isa::AluOp;

/// Executes a logical or comparison operation.
///
/// # Returns
///
/// The 64-bit result, or `0` for non-logic opcodes.
pub const fn execute(op: AluOp, a: u64, b: u64) -> u64 {
    match op {
        AluOp::Or => a | b,
        AluOp::And => a & b,
        AluOp::Xor => a ^ b,
        AluOp::Slt => ((a as i64) < (b as i64)) as u64,
        AluOp::Sltu => (a < b) as u64,
        _ => 0,
    }
}
