//! Register Alias Table (RAT).
//!
//! Maps each architectural register to the physical register holding its newest
//! value. Two copies are kept:
//! 1. **Speculative table:** Updated by every rename; consulted by rename for sources.
//! 2. **Architectural table:** Updated only at commit; the precise state recovery
//!    restores from.
//!
//! Register `x0` is hard-wired to physical register 0 in both tables: lookups
//! always return `(p0, valid)` and renames/commits of `x0` are no-ops.

use crate::common::reg::{ArchReg, PhysReg};

/// One mapping in either table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatEntry {
    /// Physical register currently bound to the architectural register.
    pub phys: PhysReg,
    /// Whether the mapping is populated.
    pub valid: bool,
}

/// Speculative + architectural register alias tables.
#[derive(Clone, Debug)]
pub struct Rat {
    speculative: Vec<RatEntry>,
    architectural: Vec<RatEntry>,
}

impl Rat {
    /// Creates the reset tables: identity mapping `xN -> pN`, all valid.
    pub fn new(arch_regs: usize) -> Self {
        let identity: Vec<RatEntry> = (0..arch_regs)
            .map(|r| RatEntry {
                phys: PhysReg(r),
                valid: true,
            })
            .collect();
        Self {
            speculative: identity.clone(),
            architectural: identity,
        }
    }

    /// Number of architectural registers mapped.
    #[inline]
    pub fn len(&self) -> usize {
        self.speculative.len()
    }

    /// Returns true if the table maps no registers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.speculative.is_empty()
    }

    /// Looks up the speculative mapping of `reg`.
    ///
    /// # Returns
    ///
    /// `(physical register, valid)`. `x0` always yields `(p0, true)`.
    #[inline]
    pub fn lookup(&self, reg: ArchReg) -> (PhysReg, bool) {
        if reg.is_zero() {
            return (PhysReg::ZERO, true);
        }
        let e = self.speculative[reg.0];
        (e.phys, e.valid)
    }

    /// Architectural (committed) mapping of `reg`.
    #[inline]
    pub fn committed(&self, reg: ArchReg) -> PhysReg {
        if reg.is_zero() {
            PhysReg::ZERO
        } else {
            self.architectural[reg.0].phys
        }
    }

    /// Binds `reg` to `phys` in the speculative table. No-op for `x0`.
    pub fn rename(&mut self, reg: ArchReg, phys: PhysReg) {
        if reg.is_zero() {
            return;
        }
        self.speculative[reg.0] = RatEntry { phys, valid: true };
    }

    /// Binds `reg` to `phys` in the architectural table. No-op for `x0`.
    ///
    /// # Returns
    ///
    /// The superseded architectural mapping, which no in-flight instruction can
    /// still read and which is therefore free to recycle. `None` for `x0`.
    pub fn commit(&mut self, reg: ArchReg, phys: PhysReg) -> Option<PhysReg> {
        if reg.is_zero() {
            return None;
        }
        let prev = self.architectural[reg.0].phys;
        self.architectural[reg.0] = RatEntry { phys, valid: true };
        Some(prev)
    }

    /// Restores the speculative table from the architectural table.
    pub fn recover(&mut self) {
        self.speculative.copy_from_slice(&self.architectural);
    }

    /// Returns true if every speculative mapping equals its architectural mapping.
    pub fn speculative_matches_architectural(&self) -> bool {
        self.speculative == self.architectural
    }

    /// Speculative table, indexed by architectural register.
    pub fn speculative(&self) -> &[RatEntry] {
        &self.speculative
    }

    /// Architectural table, indexed by architectural register.
    pub fn architectural(&self) -> &[RatEntry] {
        &self.architectural
    }
}
