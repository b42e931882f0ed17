//! Instruction Set Definitions.
//!
//! The core consumes *decoded* instruction records rather than encodings, so this
//! module describes the subset of RV64I the functional units implement:
//!
//! * `abi`: ABI register names used when printing register state.
//! * `instruction`: The decoded record handed from fetch to rename, its opcodes, and constructors.
//! * `program`: A flat instruction image addressed by program counter, loadable from JSON.

/// Application Binary Interface (ABI) register name mappings.
pub mod abi;

/// Decoded instruction records and opcode classes.
pub mod instruction;

/// Program images and their JSON description.
pub mod program;

pub use instruction::{AluOp, BranchCond, DecodedInst, Opcode, Prediction, UnitKind};
pub use program::Program;
