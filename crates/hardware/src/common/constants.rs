//! Global Pipeline Constants.
//!
//! This module defines the constants that are fixed by the microarchitecture
//! rather than by configuration. It includes:
//! 1. **Widths:** Rename, issue, and commit bandwidth per cycle.
//! 2. **Ports:** Physical register file read/write ports and wakeup buses.
//! 3. **Instruction Geometry:** Instruction size and memory access width.

/// Instructions renamed (and fetched) per cycle.
pub const RENAME_WIDTH: usize = 2;

/// Instructions selected from the reservation station per cycle.
pub const ISSUE_WIDTH: usize = 2;

/// Instructions retired from the reorder buffer per cycle.
pub const COMMIT_WIDTH: usize = 2;

/// Completion/wakeup broadcast buses per cycle.
///
/// Each bus also drives one physical register file write port.
pub const WAKEUP_PORTS: usize = 2;

/// Physical register file read ports (two sources for each renamed instruction).
pub const PRF_READ_PORTS: usize = 4;

/// Physical register file write ports.
pub const PRF_WRITE_PORTS: usize = 2;

/// Largest value a reservation station age counter can hold (four bits).
pub const AGE_LIMIT: u8 = 15;

/// Size of every instruction in bytes.
pub const INSTRUCTION_SIZE: u64 = 4;

/// Width of a load or store access in bytes (doubleword).
pub const ACCESS_SIZE: u64 = 8;
