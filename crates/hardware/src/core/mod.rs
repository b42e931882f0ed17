//! Core processor implementation.
//!
//! This module contains the scheduling core and the components it drives:
//! the rename/reorder/scheduling pipeline, the functional units, and the
//! physical register file.

/// Architectural storage (physical register file).
pub mod arch;

/// Rename, reorder buffer, reservation station, hazards and recovery.
pub mod pipeline;

/// Execution units (ALU, branch unit and predictors, LSU).
pub mod units;

pub use self::pipeline::engine::Core;
