use rvsched_core::common::reg::PhysReg;
use rvsched_core::core::pipeline::rob::RobHandle;
use rvsched_core::core::pipeline::signals::{
    BranchOutcome, Completion, PendingCompletion, UnitStatus,
};
use rvsched_core::isa::UnitKind;

/// Builds the start-of-cycle unit snapshot fed to `Core::evaluate`.
pub struct StatusBuilder {
    status: UnitStatus,
}

impl StatusBuilder {
    /// Every unit idle with the default capacities.
    pub fn idle() -> Self {
        Self {
            status: UnitStatus {
                alu_free: 4,
                bru_free: 2,
                lsu_free: 1,
                lsu_busy: false,
                completed: Vec::new(),
            },
        }
    }

    pub fn alu_free(mut self, n: usize) -> Self {
        self.status.alu_free = n;
        self
    }

    pub fn bru_free(mut self, n: usize) -> Self {
        self.status.bru_free = n;
        self
    }

    pub fn lsu_busy(mut self) -> Self {
        self.status.lsu_busy = true;
        self.status.lsu_free = 0;
        self
    }

    pub fn completed(mut self, unit: UnitKind, completion: Completion) -> Self {
        self.status.completed.push(PendingCompletion { unit, completion });
        self
    }

    pub fn build(self) -> UnitStatus {
        self.status
    }
}

/// A plain register result.
pub fn result(rob: RobHandle, dest: Option<PhysReg>, value: u64) -> Completion {
    Completion {
        rob,
        dest,
        result: value,
        exception: None,
        branch: None,
        store: None,
    }
}

/// A resolved branch with no destination.
pub fn branch(rob: RobHandle, taken: bool, target: u64, mispredicted: bool) -> Completion {
    Completion {
        branch: Some(BranchOutcome {
            taken,
            target,
            mispredicted,
        }),
        ..result(rob, None, 0)
    }
}
