//! Load/Store Unit (LSU).
//!
//! This module provides the unit responsible for doubleword loads and stores.
//! It includes:
//! - [`memory`]: the byte-addressed data memory the unit reads from.
//!
//! The unit is not pipelined: one access is outstanding at a time, for
//! `latency` cycles, and the unit accepts nothing else until the result has
//! been taken. Loads read memory when issued. Stores only compute their
//! address and data; memory is written when the store commits.

/// Byte-addressed data memory.
pub mod memory;

use crate::common::constants::ACCESS_SIZE;
use crate::common::error::Trap;
use crate::core::pipeline::rob::RobHandle;
use crate::core::pipeline::signals::{Completion, IssuedOp, StoreInfo};
use crate::core::units::FunctionalUnit;
use crate::isa::{Opcode, UnitKind};

use self::memory::Memory;

/// The access currently occupying the unit.
#[derive(Clone, Copy, Debug)]
struct Access {
    completion: Completion,
    remaining: u64,
}

/// Non-pipelined load/store unit with its data memory.
#[derive(Clone, Debug)]
pub struct LoadStoreUnit {
    latency: u64,
    current: Option<Access>,
    memory: Memory,
}

impl LoadStoreUnit {
    /// Creates a unit with the given access latency over `memory_size` bytes of memory.
    pub fn new(latency: u64, memory_size: usize) -> Self {
        Self {
            latency,
            current: None,
            memory: Memory::new(memory_size),
        }
    }

    /// Data memory.
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Mutable data memory, for committing stores and preloading data.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    /// Performs the access for `op`: address generation, alignment and bounds checks,
    /// and the read for loads.
    pub fn execute(&self, op: &IssuedOp) -> Completion {
        let addr = op.op1.wrapping_add(op.inst.imm as u64);
        let store = matches!(op.inst.op, Opcode::Store);

        if addr % ACCESS_SIZE != 0 {
            let trap = if store {
                Trap::StoreAddressMisaligned(addr)
            } else {
                Trap::LoadAddressMisaligned(addr)
            };
            return Completion::trap(op, trap);
        }

        if store {
            if !self.memory.contains(addr, ACCESS_SIZE) {
                return Completion::trap(op, Trap::StoreAccessFault(addr));
            }
            Completion::result(op, 0).with_store(StoreInfo {
                addr,
                data: op.op2,
            })
        } else {
            match self.memory.read_u64(addr) {
                Some(value) => Completion::result(op, value),
                None => Completion::trap(op, Trap::LoadAccessFault(addr)),
            }
        }
    }
}

impl FunctionalUnit for LoadStoreUnit {
    fn kind(&self) -> UnitKind {
        UnitKind::Lsu
    }

    fn accepts(&self) -> usize {
        usize::from(self.current.is_none())
    }

    fn issue(&mut self, op: IssuedOp) {
        debug_assert!(self.current.is_none(), "issue to a busy load/store unit");
        self.current = Some(Access {
            completion: self.execute(&op),
            remaining: self.latency,
        });
    }

    fn advance(&mut self) {
        if let Some(a) = &mut self.current {
            a.remaining = a.remaining.saturating_sub(1);
        }
    }

    fn peek_completed(&self) -> Vec<Completion> {
        self.current
            .iter()
            .filter(|a| a.remaining == 0)
            .map(|a| a.completion)
            .collect()
    }

    fn take_completed(&mut self, rob: RobHandle) -> Option<Completion> {
        match self.current {
            Some(a) if a.remaining == 0 && a.completion.rob == rob => {
                self.current = None;
                Some(a.completion)
            }
            _ => None,
        }
    }

    fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    fn waiting_on_memory(&self) -> bool {
        self.current.is_some_and(|a| a.remaining > 0)
    }
}
