//! Physical Register File.
//!
//! A flat array of `P` value slots addressed by physical register index. Each
//! slot carries a ready bit: a register is *pending* from the moment rename
//! allocates it until its producer's completion writes the value. It performs
//! the following:
//! 1. **Storage:** Holds the values of all physical registers.
//! 2. **Readiness:** Tracks which registers already hold their final value, which
//!    rename uses to decide whether a source operand starts out ready.
//! 3. **Invariant Enforcement:** Physical register 0 is bound to `x0`; it always reads
//!    zero and ignores writes.

use crate::common::reg::PhysReg;

/// Physical register storage with ready bits.
#[derive(Clone, Debug)]
pub struct PhysRegFile {
    values: Vec<u64>,
    ready: Vec<bool>,
}

impl PhysRegFile {
    /// Creates a register file of `phys_regs` slots.
    ///
    /// The identity-mapped registers `[0, arch_regs)` start ready with value zero;
    /// the rename headroom starts pending.
    pub fn new(phys_regs: usize, arch_regs: usize) -> Self {
        Self {
            values: vec![0; phys_regs],
            ready: (0..phys_regs).map(|p| p < arch_regs).collect(),
        }
    }

    /// Number of physical registers.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the file has no registers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reads a register through a read port.
    ///
    /// # Returns
    ///
    /// `(value, ready)`; the value is meaningless while the register is pending.
    #[inline]
    pub fn read(&self, reg: PhysReg) -> (u64, bool) {
        if reg == PhysReg::ZERO {
            (0, true)
        } else {
            (self.values[reg.0], self.ready[reg.0])
        }
    }

    /// Returns the register value regardless of readiness.
    #[inline]
    pub fn value(&self, reg: PhysReg) -> u64 {
        self.read(reg).0
    }

    /// Returns true once the register holds its producer's result.
    #[inline]
    pub fn is_ready(&self, reg: PhysReg) -> bool {
        self.read(reg).1
    }

    /// Writes a value through a write port and marks the register ready.
    pub fn write(&mut self, reg: PhysReg, value: u64) {
        if reg != PhysReg::ZERO {
            self.values[reg.0] = value;
            self.ready[reg.0] = true;
        }
    }

    /// Marks a freshly allocated register as awaiting its producer.
    pub fn mark_pending(&mut self, reg: PhysReg) {
        if reg != PhysReg::ZERO {
            self.ready[reg.0] = false;
        }
    }
}
