//! RISC-V Application Binary Interface (ABI) register names.
//!
//! Used when dumping architectural register state and when program
//! descriptions refer to registers by ABI name instead of `xN`.

/// ABI register names for x0–x31.
pub const REG_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Returns the ABI name for an integer register index.
#[inline]
pub fn name(idx: usize) -> &'static str {
    REG_NAMES.get(idx).copied().unwrap_or("x??")
}

/// Parses `xN` or an ABI name (`a0`, `sp`, `fp`, ...) into a register index.
pub fn parse(text: &str) -> Option<usize> {
    let text = text.trim();
    if let Some(num) = text.strip_prefix('x') {
        return num.parse().ok().filter(|&n: &usize| n < REG_NAMES.len());
    }
    if text == "fp" {
        return Some(8);
    }
    REG_NAMES.iter().position(|&n| n == text)
}
