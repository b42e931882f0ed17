//! ALU shift operations.
//!
//! Implements shift-left logical (SLL), shift-right logical (SRL), and
//! shift-right arithmetic (SRA). Shift amounts are masked to 6 bits (0-63).

use crate::isa::AluOp;

/// Bit mask for the shift amount (6 bits: 0-63).
const SHAMT_MASK: u64 = 0x3f;

/// Executes a shift operation.
///
/// # Returns
///
/// The 64-bit result, or `0` for non-shift opcodes.
pub const fn execute(op: AluOp, a: u64, b: u64) -> u64 {
    let sh = (b & SHAMT_MASK) as u32;
    match op {
        AluOp::Sll => a << sh,
        AluOp::Srl => a >> sh,
        AluOp::Sra => ((a as i64) >> sh) as u64,
        _ => 0,
    }
}
