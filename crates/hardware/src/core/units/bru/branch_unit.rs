//! Branch resolution unit.
//!
//! Resolves conditional branches and jumps issued by the scheduler, compares
//! the outcome with the prediction made at fetch, and produces the link value
//! for `jal`/`jalr`. A taken transfer to a target that is not instruction
//! aligned raises `InstructionAddressMisaligned`.

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::Trap;
use crate::core::pipeline::rob::RobHandle;
use crate::core::pipeline::signals::{BranchOutcome, Completion, IssuedOp};
use crate::core::units::{ExecPipe, FunctionalUnit};
use crate::isa::{Opcode, UnitKind};

/// Computes the completion of an issued control transfer.
pub fn resolve(op: &IssuedOp) -> Completion {
    let inst = &op.inst;
    let link = inst.pc.wrapping_add(INSTRUCTION_SIZE);
    let (taken, target, result) = match inst.op {
        Opcode::Branch(cond) => (cond.taken(op.op1, op.op2), inst.relative_target(), 0),
        Opcode::Jal => (true, inst.relative_target(), link),
        Opcode::Jalr => (true, op.op1.wrapping_add(inst.imm as u64) & !1, link),
        _ => (false, link, 0),
    };

    if taken && target % INSTRUCTION_SIZE != 0 {
        return Completion::trap(op, Trap::InstructionAddressMisaligned(target));
    }

    let mispredicted = inst.pred.taken != taken || (taken && inst.pred.target != target);
    Completion::result(op, result).with_branch(BranchOutcome {
        taken,
        target,
        mispredicted,
    })
}

/// Pipelined branch unit.
#[derive(Clone, Debug)]
pub struct BranchUnit {
    pipe: ExecPipe,
}

impl BranchUnit {
    /// Creates a branch unit with the given latency and in-flight capacity.
    pub fn new(latency: u64, capacity: usize) -> Self {
        Self {
            pipe: ExecPipe::new(latency, capacity),
        }
    }
}

impl FunctionalUnit for BranchUnit {
    fn kind(&self) -> UnitKind {
        UnitKind::Bru
    }

    fn accepts(&self) -> usize {
        self.pipe.accepts()
    }

    fn issue(&mut self, op: IssuedOp) {
        self.pipe.push(resolve(&op));
    }

    fn advance(&mut self) {
        self.pipe.advance();
    }

    fn peek_completed(&self) -> Vec<Completion> {
        self.pipe.completed()
    }

    fn take_completed(&mut self, rob: RobHandle) -> Option<Completion> {
        self.pipe.take(rob)
    }

    fn is_busy(&self) -> bool {
        self.pipe.is_busy()
    }
}
