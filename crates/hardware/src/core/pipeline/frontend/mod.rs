//! Instruction fetch.
//!
//! The fetch unit walks a [`Program`] image and hands the core groups of up to
//! [`RENAME_WIDTH`] decoded instructions. It predicts as it goes:
//! 1. **Conditional branches:** direction from the branch predictor; the target
//!    is the pc-relative offset carried by the instruction.
//! 2. **`jal`:** always taken to its pc-relative target.
//! 3. **`jalr`:** taken to the BTB target on a hit, otherwise fall through.
//!
//! A group ends after a predicted-taken transfer, and fetch continues at the
//! predicted target next cycle. Fetching outside the program yields nothing.

use tracing::trace;

use crate::common::constants::{INSTRUCTION_SIZE, RENAME_WIDTH};
use crate::core::units::bru::BranchPredictor;
use crate::isa::{DecodedInst, Opcode, Prediction, Program};

/// Program counter generation and prediction.
#[derive(Clone, Debug)]
pub struct FetchUnit {
    pc: u64,
}

impl FetchUnit {
    /// Creates a fetch unit starting at `pc`.
    pub const fn new(pc: u64) -> Self {
        Self { pc }
    }

    /// Next address to fetch.
    pub const fn pc(&self) -> u64 {
        self.pc
    }

    /// Restarts fetch at `pc` after a misprediction or exception.
    pub fn redirect(&mut self, pc: u64) {
        trace!(pc = format_args!("{pc:#x}"), "fetch redirect");
        self.pc = pc;
    }

    /// Returns true when the fetch address lies outside `program`.
    pub fn is_drained(&self, program: &Program) -> bool {
        program.fetch(self.pc).is_none()
    }

    /// Fetches the next group and advances the fetch address past it.
    pub fn fetch<P: BranchPredictor + ?Sized>(
        &mut self,
        program: &Program,
        predictor: &P,
    ) -> Vec<DecodedInst> {
        let mut group = Vec::with_capacity(RENAME_WIDTH);
        while group.len() < RENAME_WIDTH {
            let Some(&inst) = program.fetch(self.pc) else {
                break;
            };
            let pred = Self::predict(&inst, predictor);
            group.push(DecodedInst { pred, ..inst });

            if pred.taken {
                self.pc = pred.target;
                break;
            }
            self.pc = self.pc.wrapping_add(INSTRUCTION_SIZE);
        }
        group
    }

    fn predict<P: BranchPredictor + ?Sized>(inst: &DecodedInst, predictor: &P) -> Prediction {
        let taken_to = |target| Prediction {
            taken: true,
            target,
        };
        if inst.illegal {
            return Prediction::default();
        }
        match inst.op {
            Opcode::Branch(_) => match predictor.predict_branch(inst.pc) {
                (true, _) => taken_to(inst.relative_target()),
                (false, _) => Prediction::default(),
            },
            Opcode::Jal => taken_to(inst.relative_target()),
            Opcode::Jalr => predictor
                .predict_btb(inst.pc)
                .map_or_else(Prediction::default, taken_to),
            _ => Prediction::default(),
        }
    }
}
