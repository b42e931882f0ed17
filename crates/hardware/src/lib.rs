//! Out-of-order scheduling core simulator library.
//!
//! This crate implements a cycle-accurate model of a two-wide out-of-order
//! scheduling core with the following:
//! 1. **Core:** Free list, register alias tables, reorder buffer, reservation
//!    station, hazard controller and recovery state machine, advanced in two
//!    phases (evaluate, then apply) every cycle.
//! 2. **Units:** Pipelined ALU and branch unit, a non-pipelined load/store unit
//!    with data memory, and static or bimodal branch prediction.
//! 3. **ISA:** A decoded RV64I subset and a JSON program format.
//! 4. **Simulation:** Fetch, the cycle driver, configuration, and statistics collection.

/// Common types and constants (registers, traps, errors, pipeline widths).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// Scheduling core (pipeline structures, functional units, register file).
pub mod core;
/// Instruction set (decoded instructions, ABI names, programs).
pub mod isa;
/// Cycle driver and input loading.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The scheduling core; drive it with `Core::evaluate` and `Core::apply`.
pub use crate::core::Core;
/// Top-level simulator; construct with `Simulator::new`.
pub use crate::sim::Simulator;
