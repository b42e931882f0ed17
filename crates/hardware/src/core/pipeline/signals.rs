//! Per-cycle signals exchanged between the scheduling core and its collaborators.
//!
//! This module defines the records that cross the core boundary each cycle:
//! 1. **Issue:** Operations handed to the functional units by the scheduler.
//! 2. **Completion:** Outcomes reported back by the functional units.
//! 3. **Unit Status:** Start-of-cycle occupancy of the functional units.
//! 4. **Commit Outputs:** Retirement records, predictor training and store requests.
//! 5. **Cycle Output:** Everything the core produces when a cycle's plan is applied.

use crate::common::error::Trap;
use crate::common::reg::{ArchReg, PhysReg};
use crate::core::pipeline::hazards::{HazardClass, StageSignals};
use crate::core::pipeline::rob::RobHandle;
use crate::isa::{DecodedInst, UnitKind};

/// An operation issued from the reservation station to a functional unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssuedOp {
    /// The instruction being executed.
    pub inst: DecodedInst,
    /// Reorder buffer entry the result belongs to.
    pub rob: RobHandle,
    /// Destination tag, if the instruction writes a register.
    pub dest: Option<PhysReg>,
    /// First operand value.
    pub op1: u64,
    /// Second operand value.
    pub op2: u64,
}

impl IssuedOp {
    /// Functional unit class this operation runs on.
    pub fn unit(&self) -> UnitKind {
        self.inst.unit().unwrap_or(UnitKind::Alu)
    }
}

/// Resolved control-flow outcome of a branch or jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BranchOutcome {
    /// Actual direction.
    pub taken: bool,
    /// Actual target (meaningful only when `taken`).
    pub target: u64,
    /// Whether the fetch-time prediction disagreed with the outcome.
    pub mispredicted: bool,
}

/// Address and data of a store, written to memory when the store commits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StoreInfo {
    /// Effective address.
    pub addr: u64,
    /// Doubleword to write.
    pub data: u64,
}

/// Completion record produced by a functional unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Reorder buffer entry this completion belongs to.
    pub rob: RobHandle,
    /// Destination tag broadcast to waiting consumers.
    pub dest: Option<PhysReg>,
    /// Result value.
    pub result: u64,
    /// Exception raised during execution.
    pub exception: Option<Trap>,
    /// Branch outcome, for control transfers.
    pub branch: Option<BranchOutcome>,
    /// Store address/data, for stores.
    pub store: Option<StoreInfo>,
}

impl Completion {
    /// A plain result for `op`.
    pub const fn result(op: &IssuedOp, result: u64) -> Self {
        Self {
            rob: op.rob,
            dest: op.dest,
            result,
            exception: None,
            branch: None,
            store: None,
        }
    }

    /// An excepting completion for `op`.
    ///
    /// The destination tag is dropped so no consumer is woken with a bogus value.
    pub const fn trap(op: &IssuedOp, trap: Trap) -> Self {
        Self {
            rob: op.rob,
            dest: None,
            result: 0,
            exception: Some(trap),
            branch: None,
            store: None,
        }
    }

    /// Attaches a branch outcome.
    #[must_use]
    pub const fn with_branch(mut self, outcome: BranchOutcome) -> Self {
        self.branch = Some(outcome);
        self
    }

    /// Attaches store address/data.
    #[must_use]
    pub const fn with_store(mut self, store: StoreInfo) -> Self {
        self.store = Some(store);
        self
    }
}

/// A completion waiting inside a functional unit, as seen at the start of a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingCompletion {
    /// Unit holding the result.
    pub unit: UnitKind,
    /// The completion record.
    pub completion: Completion,
}

/// Start-of-cycle status of the functional units.
#[derive(Clone, Debug, Default)]
pub struct UnitStatus {
    /// Operations the ALU can accept this cycle.
    pub alu_free: usize,
    /// Operations the branch unit can accept this cycle.
    pub bru_free: usize,
    /// Operations the load/store unit can accept this cycle.
    pub lsu_free: usize,
    /// Whether the load/store unit has an access outstanding.
    pub lsu_busy: bool,
    /// Finished results waiting for a broadcast port.
    pub completed: Vec<PendingCompletion>,
}

impl UnitStatus {
    /// Issue slots available on `unit` this cycle.
    pub const fn free(&self, unit: UnitKind) -> usize {
        match unit {
            UnitKind::Alu => self.alu_free,
            UnitKind::Bru => self.bru_free,
            UnitKind::Lsu => self.lsu_free,
        }
    }
}

/// Retirement record: the commit-time register write request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommitRecord {
    /// Sequence number of the retired instruction.
    pub seq: u64,
    /// Program counter.
    pub pc: u64,
    /// Architectural destination, if any.
    pub arch_dest: Option<ArchReg>,
    /// Physical register now holding the architectural value.
    pub phys_dest: Option<PhysReg>,
    /// Value written.
    pub value: u64,
}

/// Training request for the branch predictor, one per committed control transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PredictorUpdate {
    /// Program counter of the branch.
    pub pc: u64,
    /// Actual direction.
    pub taken: bool,
    /// Actual target.
    pub target: u64,
    /// False for unconditional jumps, which only train the target buffer.
    pub conditional: bool,
}

/// Everything the core produces when it applies a cycle plan.
#[derive(Clone, Debug, Default)]
pub struct CycleOutput {
    /// Hazard class in force this cycle.
    pub hazard: HazardClass,
    /// Per-stage stall/flush signals derived from the hazard class.
    pub signals: StageSignals,
    /// Operations to hand to the functional units.
    pub issued: Vec<IssuedOp>,
    /// Completions to remove from the functional units (accepted and stale).
    pub taken: Vec<(UnitKind, RobHandle)>,
    /// Instructions retired this cycle, oldest first.
    pub commits: Vec<CommitRecord>,
    /// Stores to perform in memory, oldest first.
    pub stores: Vec<StoreInfo>,
    /// Predictor training requests.
    pub predictor_updates: Vec<PredictorUpdate>,
    /// Trap taken this cycle.
    pub trap: Option<Trap>,
    /// New fetch address after a misprediction or exception.
    pub redirect: Option<u64>,
    /// Asserted while recovery holds in its final state.
    pub flush_pulse: bool,
    /// Whether the rename latch is empty and can take a new fetch group.
    pub fetch_ready: bool,
}
