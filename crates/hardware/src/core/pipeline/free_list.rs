//! Free List of physical registers.
//!
//! The free list is the pool of physical register identifiers not currently bound
//! to any architectural register or in-flight destination. It provides:
//! 1. **Atomic Allocation:** Dequeues one or two identifiers per rename group, or none at all.
//! 2. **Release:** Returns identifiers superseded at commit or squashed on recovery.
//! 3. **Occupancy:** Exports the number of available identifiers to the hazard controller.
//!
//! Identifiers are handed out in FIFO order, so a register released this cycle is
//! never the one allocated in the same cycle while older free entries remain.

use std::collections::VecDeque;

use crate::common::reg::PhysReg;

/// FIFO pool of unallocated physical registers.
#[derive(Clone, Debug)]
pub struct FreeList {
    /// Available identifiers, oldest first.
    free: VecDeque<PhysReg>,
    /// Number of renameable registers (`P - A`).
    capacity: usize,
}

impl FreeList {
    /// Creates the reset free list `[arch_regs, phys_regs)`.
    pub fn new(arch_regs: usize, phys_regs: usize) -> Self {
        let free: VecDeque<PhysReg> = (arch_regs..phys_regs).map(PhysReg).collect();
        Self {
            capacity: free.len(),
            free,
        }
    }

    /// Number of identifiers currently available.
    #[inline]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total identifiers the list can hold.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if no identifier is available.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Returns true if a request for `n` identifiers would succeed this cycle.
    #[inline]
    pub fn can_allocate(&self, n: usize) -> bool {
        self.free.len() >= n
    }

    /// The identifiers the next `allocate(n)` would return, without dequeuing them.
    pub fn peek(&self, n: usize) -> Option<Vec<PhysReg>> {
        self.can_allocate(n)
            .then(|| self.free.iter().take(n).copied().collect())
    }

    /// Dequeues `n` identifiers.
    ///
    /// The request is all-or-nothing: if fewer than `n` are available, nothing is
    /// dequeued and `None` is returned.
    pub fn allocate(&mut self, n: usize) -> Option<Vec<PhysReg>> {
        if !self.can_allocate(n) {
            return None;
        }
        Some(self.free.drain(..n).collect())
    }

    /// Enqueues an identifier. Register 0 is bound to `x0` and is never recycled.
    pub fn release(&mut self, reg: PhysReg) {
        if reg == PhysReg::ZERO {
            return;
        }
        debug_assert!(!self.free.contains(&reg), "{reg} released twice");
        debug_assert!(self.free.len() < self.capacity, "free list overflow");
        self.free.push_back(reg);
    }

    /// Returns true if `reg` is currently available.
    pub fn contains(&self, reg: PhysReg) -> bool {
        self.free.contains(&reg)
    }

    /// Iterates over the available identifiers in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = PhysReg> + '_ {
        self.free.iter().copied()
    }
}
