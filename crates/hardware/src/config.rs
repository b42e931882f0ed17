//! Configuration system for the scheduling core.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the simulator. It provides:
//! 1. **Defaults:** Baseline structure sizes, latencies, and vectors.
//! 2. **Structures:** Hierarchical config for general, core, functional unit, and predictor settings.
//! 3. **Validation:** A single `validate` pass that rejects configurations the core cannot model.
//!
//! Configuration is supplied as JSON (see `Config::from_json`) or built with `Config::default()`.

use serde::Deserialize;

use crate::common::constants::{
    AGE_LIMIT, COMMIT_WIDTH, INSTRUCTION_SIZE, ISSUE_WIDTH, RENAME_WIDTH,
};
use crate::common::error::{ConfigError, SimError};

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden in a JSON configuration file.
mod defaults {
    /// Architectural integer registers (x0-x31).
    pub const ARCH_REGS: usize = 32;

    /// Physical registers; the 32 above the architectural count are rename headroom.
    pub const PHYS_REGS: usize = 64;

    /// Reorder buffer entries.
    pub const ROB_SIZE: usize = 32;

    /// Reservation station entries.
    pub const RS_SIZE: usize = 16;

    /// Saturation bound of the reservation station age counter (4 bits).
    pub const AGE_MAX: u8 = crate::common::constants::AGE_LIMIT;

    /// Cycles the recovery state machine holds in `Complete` before returning to idle.
    pub const RECOVERY_HOLD_CYCLES: u32 = 2;

    /// Fetch redirect target when an exception commits.
    pub const EXCEPTION_VECTOR: u64 = 0x0000_0100;

    /// Address of the first instruction.
    pub const START_PC: u64 = 0x0000_1000;

    /// Cycle budget for `Simulator::run`.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// Integer ALU result latency in cycles.
    pub const ALU_LATENCY: u64 = 1;

    /// Operations the ALU pipeline can hold at once.
    pub const ALU_CAPACITY: usize = 4;

    /// Branch unit result latency in cycles.
    pub const BRU_LATENCY: u64 = 1;

    /// Operations the branch unit pipeline can hold at once.
    pub const BRU_CAPACITY: usize = 2;

    /// Load/store unit access latency in cycles.
    pub const LSU_LATENCY: u64 = 3;

    /// Size of the data memory behind the load/store unit (64 KiB).
    pub const MEMORY_SIZE: usize = 64 * 1024;

    /// Default Branch Target Buffer size (256 entries).
    pub const BTB_SIZE: usize = 256;

    /// Default bimodal pattern table size (1024 two-bit counters).
    pub const BIMODAL_SIZE: usize = 1024;
}

/// Branch prediction algorithms available to the fetch unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BranchPredictor {
    /// Conditional branches predicted not taken; indirect jumps use the BTB.
    #[default]
    Static,
    /// Per-PC two-bit saturating counters backed by the BTB.
    Bimodal,
}

/// Root configuration structure containing all simulator settings.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use rvsched_core::config::{BranchPredictor, Config};
///
/// let json = r#"{
///     "core": { "rob_size": 16, "rs_size": 8 },
///     "predictor": { "kind": "Bimodal" }
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.core.rob_size, 16);
/// assert_eq!(config.core.phys_regs, 64);
/// assert_eq!(config.predictor.kind, BranchPredictor::Bimodal);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// General simulation settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Rename, reorder buffer, and scheduler sizing
    #[serde(default)]
    pub core: CoreConfig,
    /// Functional unit latencies and capacities
    #[serde(default)]
    pub units: UnitConfig,
    /// Branch predictor configuration
    #[serde(default)]
    pub predictor: PredictorConfig,
}

impl Config {
    /// Parses a JSON configuration document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed documents and
    /// [`SimError::Config`] when the values fail validation.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json).map_err(|source| SimError::Json {
            what: "config",
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a machine the core can model.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let core = &self.core;
        if core.arch_regs < 2 {
            return Err(ConfigError::TooSmall {
                structure: "architectural register file",
                min: 2,
                got: core.arch_regs,
            });
        }
        if core.phys_regs <= core.arch_regs {
            return Err(ConfigError::NoRenameHeadroom {
                arch: core.arch_regs,
                phys: core.phys_regs,
            });
        }
        if core.phys_regs - core.arch_regs < RENAME_WIDTH {
            return Err(ConfigError::TooSmall {
                structure: "free list",
                min: RENAME_WIDTH,
                got: core.phys_regs - core.arch_regs,
            });
        }
        if core.rob_size < COMMIT_WIDTH {
            return Err(ConfigError::TooSmall {
                structure: "reorder buffer",
                min: COMMIT_WIDTH,
                got: core.rob_size,
            });
        }
        if core.rs_size < ISSUE_WIDTH {
            return Err(ConfigError::TooSmall {
                structure: "reservation station",
                min: ISSUE_WIDTH,
                got: core.rs_size,
            });
        }
        if core.age_max == 0 || core.age_max > AGE_LIMIT {
            return Err(ConfigError::AgeBound {
                got: core.age_max,
                limit: AGE_LIMIT,
            });
        }
        if core.exception_vector % INSTRUCTION_SIZE != 0 {
            return Err(ConfigError::MisalignedVector(core.exception_vector));
        }

        let units = &self.units;
        for (unit, latency) in [
            ("alu", units.alu_latency),
            ("bru", units.bru_latency),
            ("lsu", units.lsu_latency),
        ] {
            if latency == 0 {
                return Err(ConfigError::ZeroLatency { unit });
            }
        }
        for (structure, capacity) in [("alu", units.alu_capacity), ("bru", units.bru_capacity)] {
            if capacity == 0 {
                return Err(ConfigError::TooSmall {
                    structure,
                    min: 1,
                    got: capacity,
                });
            }
        }

        for (table, size) in [
            ("btb", self.predictor.btb_size),
            ("bimodal", self.predictor.bimodal_size),
        ] {
            if !size.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo { table, got: size });
            }
        }
        Ok(())
    }
}

/// General simulation settings and options.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Emit per-instruction rename/issue/commit events at `debug` level.
    #[serde(default)]
    pub trace_instructions: bool,

    /// Address of the first instruction.
    #[serde(default = "GeneralConfig::default_start_pc")]
    pub start_pc: u64,

    /// Cycle budget before `Simulator::run` gives up.
    #[serde(default = "GeneralConfig::default_max_cycles")]
    pub max_cycles: u64,
}

impl GeneralConfig {
    /// Returns the default starting program counter.
    const fn default_start_pc() -> u64 {
        defaults::START_PC
    }

    /// Returns the default cycle budget.
    const fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            trace_instructions: false,
            start_pc: defaults::START_PC,
            max_cycles: defaults::MAX_CYCLES,
        }
    }
}

/// Sizing of the rename, reorder, and scheduling structures.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Architectural register count (`A`).
    #[serde(default = "CoreConfig::default_arch_regs")]
    pub arch_regs: usize,

    /// Physical register count (`P`); the free list holds `P - A` entries.
    #[serde(default = "CoreConfig::default_phys_regs")]
    pub phys_regs: usize,

    /// Reorder buffer entries (`R`).
    #[serde(default = "CoreConfig::default_rob_size")]
    pub rob_size: usize,

    /// Reservation station entries (`S`).
    #[serde(default = "CoreConfig::default_rs_size")]
    pub rs_size: usize,

    /// Saturation bound of the reservation station age counter.
    #[serde(default = "CoreConfig::default_age_max")]
    pub age_max: u8,

    /// Cycles spent in the recovery `Complete` state.
    #[serde(default = "CoreConfig::default_recovery_hold_cycles")]
    pub recovery_hold_cycles: u32,

    /// Redirect target for committed exceptions.
    #[serde(default = "CoreConfig::default_exception_vector")]
    pub exception_vector: u64,
}

impl CoreConfig {
    const fn default_arch_regs() -> usize {
        defaults::ARCH_REGS
    }

    const fn default_phys_regs() -> usize {
        defaults::PHYS_REGS
    }

    const fn default_rob_size() -> usize {
        defaults::ROB_SIZE
    }

    const fn default_rs_size() -> usize {
        defaults::RS_SIZE
    }

    const fn default_age_max() -> u8 {
        defaults::AGE_MAX
    }

    const fn default_recovery_hold_cycles() -> u32 {
        defaults::RECOVERY_HOLD_CYCLES
    }

    const fn default_exception_vector() -> u64 {
        defaults::EXCEPTION_VECTOR
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            arch_regs: defaults::ARCH_REGS,
            phys_regs: defaults::PHYS_REGS,
            rob_size: defaults::ROB_SIZE,
            rs_size: defaults::RS_SIZE,
            age_max: defaults::AGE_MAX,
            recovery_hold_cycles: defaults::RECOVERY_HOLD_CYCLES,
            exception_vector: defaults::EXCEPTION_VECTOR,
        }
    }
}

/// Functional unit timing.
#[derive(Debug, Clone, Deserialize)]
pub struct UnitConfig {
    /// ALU result latency in cycles
    #[serde(default = "UnitConfig::default_alu_latency")]
    pub alu_latency: u64,

    /// Operations in flight in the ALU pipeline
    #[serde(default = "UnitConfig::default_alu_capacity")]
    pub alu_capacity: usize,

    /// Branch unit result latency in cycles
    #[serde(default = "UnitConfig::default_bru_latency")]
    pub bru_latency: u64,

    /// Operations in flight in the branch unit pipeline
    #[serde(default = "UnitConfig::default_bru_capacity")]
    pub bru_capacity: usize,

    /// Load/store access latency in cycles (the unit is not pipelined)
    #[serde(default = "UnitConfig::default_lsu_latency")]
    pub lsu_latency: u64,

    /// Bytes of data memory behind the load/store unit
    #[serde(default = "UnitConfig::default_memory_size")]
    pub memory_size: usize,
}

impl UnitConfig {
    const fn default_alu_latency() -> u64 {
        defaults::ALU_LATENCY
    }

    const fn default_alu_capacity() -> usize {
        defaults::ALU_CAPACITY
    }

    const fn default_bru_latency() -> u64 {
        defaults::BRU_LATENCY
    }

    const fn default_bru_capacity() -> usize {
        defaults::BRU_CAPACITY
    }

    const fn default_lsu_latency() -> u64 {
        defaults::LSU_LATENCY
    }

    const fn default_memory_size() -> usize {
        defaults::MEMORY_SIZE
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            alu_latency: defaults::ALU_LATENCY,
            alu_capacity: defaults::ALU_CAPACITY,
            bru_latency: defaults::BRU_LATENCY,
            bru_capacity: defaults::BRU_CAPACITY,
            lsu_latency: defaults::LSU_LATENCY,
            memory_size: defaults::MEMORY_SIZE,
        }
    }
}

/// Branch predictor selection and table sizes.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictorConfig {
    /// Prediction algorithm
    #[serde(default)]
    pub kind: BranchPredictor,

    /// Branch Target Buffer entries (power of two)
    #[serde(default = "PredictorConfig::default_btb_size")]
    pub btb_size: usize,

    /// Bimodal counter table entries (power of two)
    #[serde(default = "PredictorConfig::default_bimodal_size")]
    pub bimodal_size: usize,
}

impl PredictorConfig {
    const fn default_btb_size() -> usize {
        defaults::BTB_SIZE
    }

    const fn default_bimodal_size() -> usize {
        defaults::BIMODAL_SIZE
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            kind: BranchPredictor::Static,
            btb_size: defaults::BTB_SIZE,
            bimodal_size: defaults::BIMODAL_SIZE,
        }
    }
}
