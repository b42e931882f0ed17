//! Execution units and functional components.
//!
//! This module contains the functional units the scheduler issues to and the
//! branch predictors used by fetch:
//! 1. **ALU:** Pipelined integer unit.
//! 2. **BRU:** Pipelined branch resolution unit, plus the branch predictors.
//! 3. **LSU:** Non-pipelined load/store unit with its backing memory.
//!
//! Every unit implements [`FunctionalUnit`]. Finished results stay inside the
//! unit until the core grants them a broadcast port and asks for them by
//! reorder buffer handle.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Branch Resolution Unit including branch predictors and BTB.
pub mod bru;

/// Load/Store Unit and backing memory.
pub mod lsu;

use crate::config::UnitConfig;
use crate::core::pipeline::rob::RobHandle;
use crate::core::pipeline::signals::{
    Completion, CycleOutput, IssuedOp, PendingCompletion, StoreInfo, UnitStatus,
};
use crate::isa::UnitKind;

use self::alu::AluUnit;
use self::bru::BranchUnit;
use self::lsu::LoadStoreUnit;

/// Common interface of the functional units.
pub trait FunctionalUnit {
    /// Unit class.
    fn kind(&self) -> UnitKind;

    /// Operations the unit can accept this cycle.
    fn accepts(&self) -> usize;

    /// Starts executing `op`. Callers only issue when [`FunctionalUnit::accepts`] is non-zero.
    fn issue(&mut self, op: IssuedOp);

    /// Advances in-flight work by one cycle.
    fn advance(&mut self);

    /// Finished results waiting for a broadcast port.
    fn peek_completed(&self) -> Vec<Completion>;

    /// Removes the finished result for `rob`, if there is one.
    fn take_completed(&mut self, rob: RobHandle) -> Option<Completion>;

    /// Returns true if any operation is in flight or waiting.
    fn is_busy(&self) -> bool;

    /// Returns true while a memory access is outstanding.
    fn waiting_on_memory(&self) -> bool {
        false
    }
}

/// An operation travelling through a pipelined unit.
#[derive(Clone, Copy, Debug)]
struct InFlight {
    completion: Completion,
    remaining: u64,
}

/// Pipelined execution: results are computed at issue and released after
/// `latency` cycles. At most `capacity` operations (including finished ones
/// not yet taken) are held at once.
#[derive(Clone, Debug)]
pub(crate) struct ExecPipe {
    latency: u64,
    capacity: usize,
    slots: Vec<InFlight>,
}

impl ExecPipe {
    pub(crate) fn new(latency: u64, capacity: usize) -> Self {
        Self {
            latency,
            capacity,
            slots: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn accepts(&self) -> usize {
        self.capacity.saturating_sub(self.slots.len())
    }

    pub(crate) fn push(&mut self, completion: Completion) {
        debug_assert!(self.accepts() > 0, "issue to a full unit");
        self.slots.push(InFlight {
            completion,
            remaining: self.latency,
        });
    }

    pub(crate) fn advance(&mut self) {
        for s in &mut self.slots {
            s.remaining = s.remaining.saturating_sub(1);
        }
    }

    pub(crate) fn completed(&self) -> Vec<Completion> {
        self.slots
            .iter()
            .filter(|s| s.remaining == 0)
            .map(|s| s.completion)
            .collect()
    }

    pub(crate) fn take(&mut self, rob: RobHandle) -> Option<Completion> {
        let idx = self
            .slots
            .iter()
            .position(|s| s.remaining == 0 && s.completion.rob == rob)?;
        Some(self.slots.remove(idx).completion)
    }

    pub(crate) fn is_busy(&self) -> bool {
        !self.slots.is_empty()
    }
}

/// The set of functional units attached to the core.
#[derive(Clone, Debug)]
pub struct ExecUnits {
    /// Integer unit.
    pub alu: AluUnit,
    /// Branch unit.
    pub bru: BranchUnit,
    /// Load/store unit.
    pub lsu: LoadStoreUnit,
}

impl ExecUnits {
    /// Builds the units from configuration.
    pub fn new(config: &UnitConfig) -> Self {
        Self {
            alu: AluUnit::new(config.alu_latency, config.alu_capacity),
            bru: BranchUnit::new(config.bru_latency, config.bru_capacity),
            lsu: LoadStoreUnit::new(config.lsu_latency, config.memory_size),
        }
    }

    /// The unit of class `kind`.
    pub fn unit(&self, kind: UnitKind) -> &dyn FunctionalUnit {
        match kind {
            UnitKind::Alu => &self.alu,
            UnitKind::Bru => &self.bru,
            UnitKind::Lsu => &self.lsu,
        }
    }

    fn unit_mut(&mut self, kind: UnitKind) -> &mut dyn FunctionalUnit {
        match kind {
            UnitKind::Alu => &mut self.alu,
            UnitKind::Bru => &mut self.bru,
            UnitKind::Lsu => &mut self.lsu,
        }
    }

    /// Start-of-cycle status for [`Core::evaluate`](crate::core::pipeline::engine::Core::evaluate).
    pub fn status(&self) -> UnitStatus {
        let units: [&dyn FunctionalUnit; 3] = [&self.alu, &self.bru, &self.lsu];
        UnitStatus {
            alu_free: self.alu.accepts(),
            bru_free: self.bru.accepts(),
            lsu_free: self.lsu.accepts(),
            lsu_busy: self.lsu.waiting_on_memory(),
            completed: units
                .iter()
                .flat_map(|u| {
                    u.peek_completed()
                        .into_iter()
                        .map(|completion| PendingCompletion {
                            unit: u.kind(),
                            completion,
                        })
                })
                .collect(),
        }
    }

    /// Applies the core's unit-side outputs: removes taken completions, accepts
    /// issued operations, then advances every unit by one cycle.
    pub fn apply(&mut self, out: &CycleOutput) {
        for &(kind, rob) in &out.taken {
            let _ = self.unit_mut(kind).take_completed(rob);
        }
        for op in &out.issued {
            self.unit_mut(op.unit()).issue(*op);
        }
        self.alu.advance();
        self.bru.advance();
        self.lsu.advance();
    }

    /// Performs committed stores in memory.
    pub fn commit_stores(&mut self, stores: &[StoreInfo]) {
        for s in stores {
            self.lsu.memory_mut().write_u64(s.addr, s.data);
        }
    }

    /// Returns true if no unit has work in flight.
    pub fn is_idle(&self) -> bool {
        !(self.alu.is_busy() || self.bru.is_busy() || self.lsu.is_busy())
    }
}
