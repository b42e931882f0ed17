//! Bimodal Branch Predictor.
//!
//! A table of 2-bit saturating counters indexed by the program counter. Unlike
//! history-based predictors, every static branch trains its own counter, which
//! suits loop back-edges and data-independent branches.
//!
//! # Performance
//!
//! - **Time Complexity:** O(1) predict and update
//! - **Space Complexity:** O(N) counters
//! - **Best Case:** Strongly biased branches
//! - **Worst Case:** Branches that alternate direction

use super::{BranchPredictor, btb::Btb};

/// Counter value at and above which a branch is predicted taken.
const TAKEN_THRESHOLD: u8 = 2;
/// Counter saturation bound.
const COUNTER_MAX: u8 = 3;

/// Bimodal Predictor structure.
#[derive(Clone, Debug)]
pub struct BimodalPredictor {
    /// Pattern table of 2-bit saturating counters, initialised weakly not-taken.
    pht: Vec<u8>,
    /// Branch Target Buffer.
    btb: Btb,
}

impl BimodalPredictor {
    /// Creates a predictor with `table_size` counters and `btb_size` BTB entries.
    ///
    /// Both sizes must be powers of two.
    pub fn new(table_size: usize, btb_size: usize) -> Self {
        debug_assert!(table_size.is_power_of_two());
        Self {
            pht: vec![1; table_size],
            btb: Btb::new(btb_size),
        }
    }

    fn index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) & (self.pht.len() - 1)
    }
}

impl BranchPredictor for BimodalPredictor {
    /// Predicts taken when the counter is 2 or 3; the target comes from the BTB.
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>) {
        if self.pht[self.index(pc)] >= TAKEN_THRESHOLD {
            (true, self.btb.lookup(pc))
        } else {
            (false, None)
        }
    }

    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>) {
        let idx = self.index(pc);
        let counter = &mut self.pht[idx];
        if taken {
            *counter = (*counter + 1).min(COUNTER_MAX);
        } else {
            *counter = counter.saturating_sub(1);
        }

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
