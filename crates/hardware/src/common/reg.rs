//! Register Identifiers.
//!
//! Architectural registers are the 32 integer registers visible to software;
//! physical registers are the larger pool that renaming maps them onto.
//! Keeping the two as distinct types stops a rename table from being indexed
//! with the wrong kind of number.

use std::fmt;

/// Architectural (ISA-visible) register index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ArchReg(pub usize);

impl ArchReg {
    /// The hard-wired zero register.
    pub const ZERO: Self = Self(0);

    /// Returns true for the hard-wired zero register.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ArchReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Physical register index; also the wakeup tag of the instruction that writes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PhysReg(pub usize);

impl PhysReg {
    /// Physical register permanently bound to the zero register.
    pub const ZERO: Self = Self(0);
}

impl fmt::Display for PhysReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}
