//! Architectural storage components.
//!
//! This module contains the storage the scheduling core reads and writes but
//! does not own the semantics of:
//! 1. **Physical Register File:** Value slots plus per-register ready bits, addressed
//!    by physical register index through four read and two write ports.

/// Physical register file implementation.
pub mod prf;

pub use prf::PhysRegFile;
