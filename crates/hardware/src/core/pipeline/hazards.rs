//! Hazard classification and per-stage stall/flush signals.
//!
//! Every cycle the controller looks at the start-of-cycle state of the core and
//! its functional units and picks the single highest-priority hazard:
//! 1. **Exception:** An excepting instruction is committing, or its recovery is running.
//! 2. **Mispredict:** A mispredicted branch is committing, or its recovery is running.
//! 3. **Structural:** Rename cannot proceed (ROB full, RS full, free list short).
//! 4. **Resource:** A functional unit cannot accept work.
//! 5. **Memory:** The load/store unit has an access outstanding.
//!
//! The class maps to a fixed stall/flush pattern over the pipeline stages. Both
//! functions here are pure; nothing is cached between cycles.

use crate::core::pipeline::recovery::RecoveryCause;

/// Hazard classes, ordered by increasing priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum HazardClass {
    /// No hazard.
    #[default]
    None,
    /// Memory unit busy.
    Memory,
    /// Functional unit at capacity.
    Resource,
    /// ROB, reservation station or free list exhausted.
    Structural,
    /// Branch misprediction.
    Mispredict,
    /// Exception.
    Exception,
}

impl HazardClass {
    /// All classes, lowest priority first.
    pub const ALL: [Self; 6] = [
        Self::None,
        Self::Memory,
        Self::Resource,
        Self::Structural,
        Self::Mispredict,
        Self::Exception,
    ];

    /// Short lowercase name used in logs and statistics.
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Memory => "memory",
            Self::Resource => "resource",
            Self::Structural => "structural",
            Self::Mispredict => "mispredict",
            Self::Exception => "exception",
        }
    }
}

/// Pipeline stages the controller drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Instruction fetch.
    Fetch,
    /// Decode.
    Decode,
    /// Rename / allocation.
    Rename,
    /// Select and issue.
    Issue,
    /// Functional-unit execution.
    Execute,
    /// Memory access.
    Memory,
}

/// Stall and flush outputs for one stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StageControl {
    /// Hold the stage's contents for this cycle.
    pub stall: bool,
    /// Discard the stage's contents.
    pub flush: bool,
}

impl StageControl {
    /// Neither stalled nor flushed.
    pub const IDLE: Self = Self {
        stall: false,
        flush: false,
    };
    /// Held in place.
    pub const STALL: Self = Self {
        stall: true,
        flush: false,
    };
    /// Held and emptied.
    pub const STALL_FLUSH: Self = Self {
        stall: true,
        flush: true,
    };
}

/// Stall/flush outputs for every stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct StageSignals {
    /// Fetch.
    pub fetch: StageControl,
    /// Decode.
    pub decode: StageControl,
    /// Rename.
    pub rename: StageControl,
    /// Issue.
    pub issue: StageControl,
    /// Execute.
    pub execute: StageControl,
    /// Memory.
    pub memory: StageControl,
}

impl StageSignals {
    /// Stage pattern for a hazard class.
    ///
    /// Exceptions and mispredictions stall and flush everything up to issue and
    /// leave execute alone, so in-flight unit work drains. Structural hazards
    /// stall rename and the stages feeding it. Resource and memory hazards stall
    /// only the stage that needs the busy unit.
    pub const fn for_class(class: HazardClass) -> Self {
        use StageControl as C;
        match class {
            HazardClass::None => Self::front(C::IDLE),
            HazardClass::Exception | HazardClass::Mispredict => Self {
                issue: C::STALL_FLUSH,
                ..Self::front(C::STALL_FLUSH)
            },
            HazardClass::Structural => Self::front(C::STALL),
            HazardClass::Resource => Self {
                issue: C::STALL,
                ..Self::front(C::IDLE)
            },
            HazardClass::Memory => Self {
                memory: C::STALL,
                ..Self::front(C::IDLE)
            },
        }
    }

    /// `c` on fetch, decode and rename; everything else idle.
    const fn front(c: StageControl) -> Self {
        Self {
            fetch: c,
            decode: c,
            rename: c,
            issue: StageControl::IDLE,
            execute: StageControl::IDLE,
            memory: StageControl::IDLE,
        }
    }

    /// Outputs for one stage.
    pub const fn stage(&self, stage: Stage) -> StageControl {
        match stage {
            Stage::Fetch => self.fetch,
            Stage::Decode => self.decode,
            Stage::Rename => self.rename,
            Stage::Issue => self.issue,
            Stage::Execute => self.execute,
            Stage::Memory => self.memory,
        }
    }
}

/// Start-of-cycle status the classifier reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HazardInputs {
    /// Recovery already in progress.
    pub recovering: Option<RecoveryCause>,
    /// Recovery raised by this cycle's commit window.
    pub committing: Option<RecoveryCause>,
    /// Rename has work but the ROB has no free slot.
    pub rob_full: bool,
    /// Rename has work that needs a reservation slot and none is free.
    pub rs_full: bool,
    /// The free list holds fewer registers than the rename group needs.
    pub free_list_short: bool,
    /// The ALU cannot accept an operation.
    pub alu_full: bool,
    /// The branch unit cannot accept an operation.
    pub bru_full: bool,
    /// The load/store unit has an access outstanding.
    pub lsu_busy: bool,
}

/// Picks the highest-priority hazard present in `inputs`.
pub fn classify(inputs: &HazardInputs) -> HazardClass {
    let cause_class = |c: Option<RecoveryCause>| match c {
        Some(RecoveryCause::Exception { .. }) => HazardClass::Exception,
        Some(RecoveryCause::Mispredict { .. }) => HazardClass::Mispredict,
        None => HazardClass::None,
    };

    let recovery = cause_class(inputs.recovering).max(cause_class(inputs.committing));
    if recovery != HazardClass::None {
        recovery
    } else if inputs.rob_full || inputs.rs_full || inputs.free_list_short {
        HazardClass::Structural
    } else if inputs.alu_full || inputs.bru_full {
        HazardClass::Resource
    } else if inputs.lsu_busy {
        HazardClass::Memory
    } else {
        HazardClass::None
    }
}
