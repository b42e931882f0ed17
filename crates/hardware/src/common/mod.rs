//! Common types and constants used throughout the scheduling core.
//!
//! This module provides the building blocks shared by every pipeline structure:
//! 1. **Register Identifiers:** Strong types for architectural and physical registers.
//! 2. **Constants:** Pipeline widths and port counts fixed by the microarchitecture.
//! 3. **Error Handling:** Trap representations and host-level error types.

/// Pipeline widths, port counts, and instruction geometry.
pub mod constants;

/// Trap causes and host-level error types.
pub mod error;

/// Architectural and physical register identifiers.
pub mod reg;

pub use error::{ConfigError, SimError, Trap};
pub use reg::{ArchReg, PhysReg};
