//! Trap and Error definitions.
//!
//! This module defines the two kinds of failure the simulator deals with:
//! 1. **Trap Representation:** Exceptions raised by simulated instructions. These are
//!    machine events carried on reorder buffer entries and acted on at commit.
//! 2. **Host Errors:** Configuration and I/O problems of the simulator itself, reported
//!    through `std::error::Error` via `thiserror`.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Exceptions the scheduling core can raise.
///
/// Each variant corresponds to a RISC-V synchronous exception cause. Traps are
/// recorded on the reorder buffer entry of the faulting instruction and only
/// take effect when that entry reaches the head of the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Instruction address misaligned exception.
    ///
    /// Raised when a control transfer resolves to a target that is not
    /// instruction aligned. The associated value is the misaligned target.
    InstructionAddressMisaligned(u64),

    /// Instruction access fault exception.
    ///
    /// The associated value is the faulting address.
    InstructionAccessFault(u64),

    /// Illegal instruction exception.
    ///
    /// Raised for records flagged illegal by decode. The associated value is
    /// the program counter of the instruction.
    IllegalInstruction(u64),

    /// Load address misaligned exception.
    LoadAddressMisaligned(u64),

    /// Load access fault exception.
    LoadAccessFault(u64),

    /// Store address misaligned exception.
    StoreAddressMisaligned(u64),

    /// Store access fault exception.
    StoreAccessFault(u64),
}

impl Trap {
    /// Returns the RISC-V exception cause code (`mcause`) for this trap.
    pub const fn code(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(_) => 0,
            Self::InstructionAccessFault(_) => 1,
            Self::IllegalInstruction(_) => 2,
            Self::LoadAddressMisaligned(_) => 4,
            Self::LoadAccessFault(_) => 5,
            Self::StoreAddressMisaligned(_) => 6,
            Self::StoreAccessFault(_) => 7,
        }
    }

    /// Returns the value reported alongside the cause (`mtval`).
    pub const fn value(&self) -> u64 {
        match self {
            Self::InstructionAddressMisaligned(v)
            | Self::InstructionAccessFault(v)
            | Self::IllegalInstruction(v)
            | Self::LoadAddressMisaligned(v)
            | Self::LoadAccessFault(v)
            | Self::StoreAddressMisaligned(v)
            | Self::StoreAccessFault(v) => *v,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstructionAddressMisaligned(addr) => {
                write!(f, "InstructionAddressMisaligned({addr:#x})")
            }
            Self::InstructionAccessFault(addr) => write!(f, "InstructionAccessFault({addr:#x})"),
            Self::IllegalInstruction(pc) => write!(f, "IllegalInstruction({pc:#x})"),
            Self::LoadAddressMisaligned(addr) => write!(f, "LoadAddressMisaligned({addr:#x})"),
            Self::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Self::StoreAddressMisaligned(addr) => write!(f, "StoreAddressMisaligned({addr:#x})"),
            Self::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
        }
    }
}

impl std::error::Error for Trap {}

/// Invalid configuration values, detected by [`Config::validate`](crate::config::Config::validate).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// There must be more physical than architectural registers to rename into.
    #[error("physical register count {phys} must exceed architectural register count {arch}")]
    NoRenameHeadroom {
        /// Configured architectural register count.
        arch: usize,
        /// Configured physical register count.
        phys: usize,
    },

    /// A structure was configured with fewer entries than the pipeline width.
    #[error("{structure} needs at least {min} entries, got {got}")]
    TooSmall {
        /// Name of the structure.
        structure: &'static str,
        /// Minimum legal size.
        min: usize,
        /// Configured size.
        got: usize,
    },

    /// A latency of zero cycles cannot be modelled by the unit pipelines.
    #[error("{unit} latency must be at least one cycle")]
    ZeroLatency {
        /// Name of the functional unit.
        unit: &'static str,
    },

    /// A power-of-two table size was required.
    #[error("{table} size {got} is not a power of two")]
    NotPowerOfTwo {
        /// Name of the table.
        table: &'static str,
        /// Configured size.
        got: usize,
    },

    /// The reservation station age counter must count and fit in four bits.
    #[error("age bound {got} outside 1..={limit}")]
    AgeBound {
        /// Configured bound.
        got: u8,
        /// Largest legal bound.
        limit: u8,
    },

    /// The exception vector must be instruction aligned.
    #[error("exception vector {0:#x} is not instruction aligned")]
    MisalignedVector(u64),
}

/// Host-level failures while loading or running a simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// A program or configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A program or configuration file was not valid JSON for its schema.
    #[error("malformed {what}: {source}")]
    Json {
        /// What was being parsed ("program" or "config").
        what: &'static str,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The program description contained an unusable instruction.
    #[error("instruction {index}: {reason}")]
    Program {
        /// Position of the instruction in the program.
        index: usize,
        /// Why it was rejected.
        reason: String,
    },

    /// The configuration failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The machine did not drain within the cycle budget.
    #[error("simulation did not finish within {0} cycles")]
    CycleLimit(u64),
}
