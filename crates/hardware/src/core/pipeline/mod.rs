//! Out-of-order scheduling pipeline.
//!
//! This module contains the rename, scheduling and retirement machinery of the
//! core. It includes the following components:
//! 1. **Free List / RAT:** Physical register allocation and the speculative and
//!    architectural register alias tables.
//! 2. **ROB:** The reorder buffer that retires instructions in program order.
//! 3. **Reservation Station:** Operand capture, wakeup and oldest-first select.
//! 4. **Hazards / Recovery:** Hazard classification, per-stage stall/flush
//!    signals and the flush state machine.
//! 5. **Engine:** The two-phase (`evaluate` / `apply`) cycle that ties them together.
//! 6. **Frontend:** Instruction fetch with branch prediction.

/// Two-phase cycle engine.
pub mod engine;

/// Free physical register pool.
pub mod free_list;

/// Instruction fetch.
pub mod frontend;

/// Hazard classification and stage control signals.
pub mod hazards;

/// Register alias tables.
pub mod rat;

/// Recovery state machine.
pub mod recovery;

/// Reservation station.
pub mod reservation_station;

/// Reorder buffer.
pub mod rob;

/// Records exchanged between the core and its functional units.
pub mod signals;
