//! Simulation driver and input loading.
//!
//! Provides the [`Simulator`], which wires the scheduling core to fetch, the
//! functional units and the branch predictor, and helpers for loading programs
//! and configurations from disk.

/// Program and configuration loading.
pub mod loader;

/// Cycle driver.
pub mod simulator;

pub use simulator::{RunSummary, Simulator};
