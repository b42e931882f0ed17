//! Branch Predictor Interface.
//!
//! This module defines the `BranchPredictor` trait that all branch prediction
//! implementations must adhere to. Fetch consults it for conditional branch
//! direction and for indirect jump targets; commit trains it with resolved
//! outcomes.

/// Trait for branch prediction algorithms.
///
/// Defines the interface that all branch prediction implementations
/// must provide for predicting branch directions and targets.
pub trait BranchPredictor {
    /// Predicts whether a conditional branch will be taken and its target address.
    ///
    /// # Arguments
    ///
    /// * `pc` - Program counter of the branch instruction
    ///
    /// # Returns
    ///
    /// A tuple `(taken, target)` where `taken` indicates if the branch
    /// is predicted to be taken, and `target` is the predicted target
    /// address if the predictor has one.
    fn predict_branch(&self, pc: u64) -> (bool, Option<u64>);

    /// Updates the predictor with a committed conditional branch outcome.
    ///
    /// # Arguments
    ///
    /// * `pc` - Program counter of the branch instruction
    /// * `taken` - Whether the branch was actually taken
    /// * `target` - The actual target address if the branch was taken
    fn update_branch(&mut self, pc: u64, taken: bool, target: Option<u64>);

    /// Predicts the target address for a jump instruction using the BTB.
    ///
    /// # Returns
    ///
    /// The predicted target address if available in the BTB, `None` otherwise.
    fn predict_btb(&self, pc: u64) -> Option<u64>;

    /// Records the resolved target of an unconditional jump.
    fn update_btb(&mut self, pc: u64, target: u64);
}
