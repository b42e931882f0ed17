//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for the scheduling core. It provides:
//! 1. **Cycle and IPC:** Total cycles, retired instructions, and derived metrics (CPI, IPC).
//! 2. **Instruction mix:** Counts by category (ALU, load, store, branch).
//! 3. **Branch prediction:** Committed branches, mispredictions, and accuracy.
//! 4. **Hazards:** Cycles spent under each hazard class.
//! 5. **Scheduler:** Issue, wakeup, squash and recovery activity.

use std::time::Instant;

use crate::core::pipeline::hazards::HazardClass;

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total simulator cycles elapsed.
    pub cycles: u64,
    /// Number of instructions committed (retired).
    pub instructions_retired: u64,

    /// Count of ALU instructions retired.
    pub inst_alu: u64,
    /// Count of load instructions retired.
    pub inst_load: u64,
    /// Count of store instructions retired.
    pub inst_store: u64,
    /// Count of branch/jump instructions retired.
    pub inst_branch: u64,

    /// Number of committed control transfers whose prediction was correct.
    pub branch_predictions: u64,
    /// Number of committed control transfers whose prediction was wrong.
    pub branch_mispredictions: u64,

    /// Cycles under a memory hazard.
    pub stalls_memory: u64,
    /// Cycles under a resource hazard.
    pub stalls_resource: u64,
    /// Cycles under a structural hazard.
    pub stalls_structural: u64,
    /// Cycles under a misprediction (trigger and recovery).
    pub stalls_mispredict: u64,
    /// Cycles under an exception (trigger and recovery).
    pub stalls_exception: u64,

    /// Number of exceptions taken.
    pub traps_taken: u64,
    /// Number of recovery sequences started.
    pub recoveries: u64,
    /// Instructions renamed into the ROB.
    pub renamed: u64,
    /// Operations issued to functional units.
    pub issued: u64,
    /// Operands woken by completion broadcasts.
    pub wakeups: u64,
    /// Instructions squashed by flushes.
    pub squashed: u64,
    /// Completions discarded because their ROB entry was gone.
    pub stale_completions: u64,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            instructions_retired: 0,
            inst_alu: 0,
            inst_load: 0,
            inst_store: 0,
            inst_branch: 0,
            branch_predictions: 0,
            branch_mispredictions: 0,
            stalls_memory: 0,
            stalls_resource: 0,
            stalls_structural: 0,
            stalls_mispredict: 0,
            stalls_exception: 0,
            traps_taken: 0,
            recoveries: 0,
            renamed: 0,
            issued: 0,
            wakeups: 0,
            squashed: 0,
            stale_completions: 0,
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"hazards"`, `"instruction_mix"`, `"branch"`, `"scheduler"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "hazards", "instruction_mix", "branch", "scheduler"];

impl SimStats {
    /// Counts one cycle spent under `class`.
    pub fn record_hazard(&mut self, class: HazardClass) {
        let counter = match class {
            HazardClass::None => return,
            HazardClass::Memory => &mut self.stalls_memory,
            HazardClass::Resource => &mut self.stalls_resource,
            HazardClass::Structural => &mut self.stalls_structural,
            HazardClass::Mispredict => &mut self.stalls_mispredict,
            HazardClass::Exception => &mut self.stalls_exception,
        };
        *counter += 1;
    }

    /// Cycles spent under `class`.
    pub const fn hazard_cycles(&self, class: HazardClass) -> u64 {
        match class {
            HazardClass::None => self.cycles.saturating_sub(
                self.stalls_memory
                    + self.stalls_resource
                    + self.stalls_structural
                    + self.stalls_mispredict
                    + self.stalls_exception,
            ),
            HazardClass::Memory => self.stalls_memory,
            HazardClass::Resource => self.stalls_resource,
            HazardClass::Structural => self.stalls_structural,
            HazardClass::Mispredict => self.stalls_mispredict,
            HazardClass::Exception => self.stalls_exception,
        }
    }

    /// Instructions retired per cycle.
    pub fn ipc(&self) -> f64 {
        if self.cycles == 0 {
            0.0
        } else {
            self.instructions_retired as f64 / self.cycles as f64
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();
        let cyc = self.cycles.max(1);
        let instr = self.instructions_retired.max(1);
        let pct = |n: u64, of: u64| (n as f64 / of as f64) * 100.0;

        if want("summary") {
            let cpi = cyc as f64 / instr as f64;
            let khz = (self.cycles as f64 / seconds) / 1000.0;
            println!("\n==========================================================");
            println!("OUT-OF-ORDER CORE SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {:.4} s", seconds);
            println!("sim_cycles               {}", self.cycles);
            println!("sim_freq                 {:.2} kHz", khz);
            println!("sim_insts                {}", self.instructions_retired);
            println!("sim_ipc                  {:.4}", self.ipc());
            println!("sim_cpi                  {:.4}", cpi);
            println!("----------------------------------------------------------");
        }
        if want("hazards") {
            println!("HAZARDS");
            for class in HazardClass::ALL.iter().rev() {
                let n = self.hazard_cycles(*class);
                println!(
                    "  hazard.{:<15} {} ({:.2}%)",
                    class.name(),
                    n,
                    pct(n, cyc)
                );
            }
            println!("----------------------------------------------------------");
        }
        if want("instruction_mix") {
            println!("INSTRUCTION MIX");
            for (name, n) in [
                ("alu", self.inst_alu),
                ("load", self.inst_load),
                ("store", self.inst_store),
                ("branch", self.inst_branch),
            ] {
                println!("  op.{:<19} {} ({:.2}%)", name, n, pct(n, instr));
            }
            println!("----------------------------------------------------------");
        }
        if want("branch") {
            let bp_total = self.branch_predictions + self.branch_mispredictions;
            let bp_acc = if bp_total > 0 {
                pct(self.branch_predictions, bp_total)
            } else {
                0.0
            };
            println!("BRANCH PREDICTION");
            println!("  bp.lookups             {}", bp_total);
            println!("  bp.mispredicts         {}", self.branch_mispredictions);
            println!("  bp.accuracy            {:.2}%", bp_acc);
            println!("----------------------------------------------------------");
        }
        if want("scheduler") {
            println!("SCHEDULER");
            println!("  sched.renamed          {}", self.renamed);
            println!("  sched.issued           {}", self.issued);
            println!("  sched.wakeups          {}", self.wakeups);
            println!("  sched.squashed         {}", self.squashed);
            println!("  sched.stale            {}", self.stale_completions);
            println!("  sched.recoveries       {}", self.recoveries);
            println!("  sched.traps            {}", self.traps_taken);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
