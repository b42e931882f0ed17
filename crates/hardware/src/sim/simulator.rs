//! Simulator: owns the core and its collaborators side-by-side.
//!
//! Each cycle the simulator:
//! 1. Samples the functional units and lets the core evaluate and apply its plan.
//! 2. Hands the core's taken completions and issued operations back to the units,
//!    which then advance one cycle.
//! 3. Performs committed stores and trains the branch predictor.
//! 4. Redirects fetch after a trap or misprediction, or delivers the next fetch
//!    group when the rename latch is free.

use tracing::{debug, info};

use crate::common::error::{SimError, Trap};
use crate::common::reg::ArchReg;
use crate::config::Config;
use crate::core::Core;
use crate::core::pipeline::frontend::FetchUnit;
use crate::core::pipeline::signals::CycleOutput;
use crate::core::units::ExecUnits;
use crate::core::units::bru::{BranchPredictor, BranchPredictorWrapper};
use crate::core::units::lsu::memory::Memory;
use crate::isa::Program;
use crate::stats::SimStats;

/// Outcome of [`Simulator::run`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    /// Cycles simulated.
    pub cycles: u64,
    /// Instructions retired.
    pub instructions: u64,
    /// Instructions per cycle.
    pub ipc: f64,
    /// Last trap taken, if any.
    pub trap: Option<Trap>,
}

/// Top-level simulator: core, fetch, functional units and predictor.
#[derive(Debug)]
pub struct Simulator<P: BranchPredictor = BranchPredictorWrapper> {
    program: Program,
    core: Core,
    fetch: FetchUnit,
    units: ExecUnits,
    predictor: P,
    last_trap: Option<Trap>,
}

impl Simulator {
    /// Creates a simulator with the predictor selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the configuration fails validation.
    pub fn new(config: &Config, program: Program) -> Result<Self, SimError> {
        let predictor = BranchPredictorWrapper::new(&config.predictor);
        Self::with_predictor(config, program, predictor)
    }
}

impl<P: BranchPredictor> Simulator<P> {
    /// Creates a simulator around a caller-supplied predictor.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if the configuration fails validation.
    pub fn with_predictor(config: &Config, program: Program, predictor: P) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            core: Core::new(&config.core, config.general.trace_instructions),
            fetch: FetchUnit::new(program.base()),
            units: ExecUnits::new(&config.units),
            program,
            predictor,
            last_trap: None,
        })
    }

    /// The scheduling core.
    pub const fn core(&self) -> &Core {
        &self.core
    }

    /// The functional units.
    pub const fn units(&self) -> &ExecUnits {
        &self.units
    }

    /// The branch predictor.
    pub const fn predictor(&self) -> &P {
        &self.predictor
    }

    /// The fetch unit.
    pub const fn fetch(&self) -> &FetchUnit {
        &self.fetch
    }

    /// Performance counters.
    pub const fn stats(&self) -> &SimStats {
        &self.core.stats
    }

    /// Data memory.
    pub const fn memory(&self) -> &Memory {
        self.units.lsu.memory()
    }

    /// Mutable data memory, for preloading data before a run.
    pub fn memory_mut(&mut self) -> &mut Memory {
        self.units.lsu.memory_mut()
    }

    /// Committed value of architectural register `reg`.
    pub fn arch_reg(&self, reg: usize) -> u64 {
        self.core.arch_value(ArchReg(reg))
    }

    /// Committed values of all architectural registers.
    pub fn registers(&self) -> Vec<u64> {
        (0..self.core.rat().len()).map(|r| self.arch_reg(r)).collect()
    }

    /// Last trap taken.
    pub const fn last_trap(&self) -> Option<Trap> {
        self.last_trap
    }

    /// Returns true once fetch has left the program and nothing is in flight.
    pub fn is_finished(&self) -> bool {
        self.fetch.is_drained(&self.program) && self.core.is_idle() && self.units.is_idle()
    }

    /// Advances the whole machine by one clock cycle.
    pub fn tick(&mut self) -> CycleOutput {
        let status = self.units.status();
        let plan = self.core.evaluate(&status);
        let out = self.core.apply(plan);

        self.units.apply(&out);
        self.units.commit_stores(&out.stores);
        for u in &out.predictor_updates {
            if u.conditional {
                self.predictor
                    .update_branch(u.pc, u.taken, u.taken.then_some(u.target));
            } else {
                self.predictor.update_btb(u.pc, u.target);
            }
        }

        if let Some(trap) = out.trap {
            debug!(%trap, cycle = self.core.stats.cycles, "trap taken");
            self.last_trap = Some(trap);
        }

        if let Some(pc) = out.redirect {
            self.fetch.redirect(pc);
        } else if out.fetch_ready {
            let group = self.fetch.fetch(&self.program, &self.predictor);
            self.core.deliver(group);
        }
        out
    }

    /// Runs until the machine drains or `max_cycles` cycles have elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::CycleLimit`] if the program has not finished within the budget.
    pub fn run(&mut self, max_cycles: u64) -> Result<RunSummary, SimError> {
        while !self.is_finished() {
            if self.core.stats.cycles >= max_cycles {
                return Err(SimError::CycleLimit(max_cycles));
            }
            let _ = self.tick();
        }

        let stats = &self.core.stats;
        info!(
            cycles = stats.cycles,
            instructions = stats.instructions_retired,
            "simulation finished"
        );
        Ok(RunSummary {
            cycles: stats.cycles,
            instructions: stats.instructions_retired,
            ipc: stats.ipc(),
            trap: self.last_trap,
        })
    }
}
