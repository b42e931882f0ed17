//! Branch resolution unit (BRU) and branch prediction.
//!
//! This module contains the unit that resolves control transfers at execute
//! and the predictors fetch consults:
//! 1. **Resolution:** `branch_unit` computes direction, target and link value.
//! 2. **Prediction:** a static not-taken predictor and a bimodal predictor,
//!    both backed by a branch target buffer (BTB).

pub use self::branch_predictor::BranchPredictor;
pub use self::branch_unit::BranchUnit;

/// Bimodal (per-PC two-bit counter) predictor.
pub mod bimodal;

/// Branch predictor trait.
pub mod branch_predictor;

/// Branch resolution unit.
pub mod branch_unit;

/// Branch Target Buffer for storing predicted branch targets.
pub mod btb;

/// Static branch predictor (always not-taken).
pub mod static_bp;

use self::{bimodal::BimodalPredictor, static_bp::StaticPredictor};
use crate::config::{BranchPredictor as BpType, PredictorConfig};

/// Enum wrapper for static dispatch of Branch Predictors.
#[derive(Clone, Debug)]
pub enum BranchPredictorWrapper {
    /// Not-taken predictor.
    Static(StaticPredictor),
    /// Two-bit counter predictor.
    Bimodal(BimodalPredictor),
}

impl BranchPredictorWrapper {
    /// Creates the predictor selected by configuration.
    pub fn new(config: &PredictorConfig) -> Self {
        match config.kind {
            BpType::Static => Self::Static(StaticPredictor::new(config.btb_size)),
            BpType::Bimodal => {
                Self::Bimodal(BimodalPredictor::new(config.bimodal_size, config.btb_size))
            }
        }
    }
}

impl BranchPredictor for BranchPredictorWrapper {
    #[inline(always)]
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>) {
        match self {
            Self::Static(bp) => bp.predict_branch(pc),
            Self::Bimodal(bp) => bp.predict_branch(pc),
        }
    }

    #[inline(always)]
    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>) {
        match self {
            Self::Static(bp) => bp.update_branch(pc, taken, target),
            Self::Bimodal(bp) => bp.update_branch(pc, taken, target),
        }
    }

    #[inline(always)]
    fn predict_btb(&self, pc: u64) -> Option<u64> {
        match self {
            Self::Static(bp) => bp.predict_btb(pc),
            Self::Bimodal(bp) => bp.predict_btb(pc),
        }
    }

    #[inline(always)]
    fn update_btb(&mut self, pc: u64, target: u64) {
        match self {
            Self::Static(bp) => bp.update_btb(pc, target),
            Self::Bimodal(bp) => bp.update_btb(pc, target),
        }
    }
}
