//! ALU arithmetic operations.
//!
//! Implements 64-bit addition, subtraction and multiplication (low half).
//! All operations wrap on overflow.

use crate::isa::AluOp;

/// Executes an integer arithmetic operation.
///
/// # Returns
///
/// The 64-bit result, or `0` for non-arithmetic opcodes.
pub const fn execute(op: AluOp, a: u64, b: u64) -> u64 {
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Mul => a.wrapping_mul(b),
        _ => 0,
    }
}
