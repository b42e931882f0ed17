//! Static Branch Predictor.
//!
//! Implements a simple "Always Not Taken" prediction policy for conditional branches.
//! It uses a BTB for indirect jump targets, but assumes all conditional branches
//! will fall through.

use super::{BranchPredictor, btb::Btb};

/// Static Branch Predictor structure.
#[derive(Clone, Debug)]
pub struct StaticPredictor {
    /// Branch Target Buffer for jump targets.
    btb: Btb,
}

impl StaticPredictor {
    /// Creates a new Static Predictor with a BTB of `btb_size` entries.
    pub fn new(btb_size: usize) -> Self {
        Self {
            btb: Btb::new(btb_size),
        }
    }
}

impl BranchPredictor for StaticPredictor {
    /// Always predicts conditional branches as not taken.
    fn predict_branch(&self, _pc: u64) -> (bool, Option<u64>) {
        (false, None)
    }

    /// Only records the target of taken branches. Does not maintain any direction history.
    fn update_branch(&mut self, pc: u64, _taken: bool, target: Option<u64>) {
        if let Some(tgt) = target {
            self.btb.update(pc, tgt);
        }
    }

    fn predict_btb(&self, pc: u64) -> Option<u64> {
        self.btb.lookup(pc)
    }

    fn update_btb(&mut self, pc: u64, target: u64) {
        self.btb.update(pc, target);
    }
}
