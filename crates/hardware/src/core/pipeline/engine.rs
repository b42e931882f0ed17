//! Out-of-order scheduling core.
//!
//! [`Core`] owns the free list, alias table, reorder buffer, reservation station,
//! physical register file and recovery sequencer, and advances them one cycle at a
//! time in two phases:
//! 1. **Evaluate:** [`Core::evaluate`] reads only start-of-cycle state and decides
//!    everything that happens this cycle (accepted completions, issue picks, commit
//!    count, rename count, hazard class) into a [`CyclePlan`].
//! 2. **Apply:** [`Core::apply`] performs the plan in a fixed order and returns the
//!    [`CycleOutput`] for the collaborators.
//!
//! The only same-cycle paths during apply are the rename-group bypass (the second
//! instruction sees the first one's new mapping) and a new reservation entry
//! observing this cycle's completion broadcasts through the register file.

use tracing::{debug, trace};

use crate::common::constants::{ISSUE_WIDTH, RENAME_WIDTH, WAKEUP_PORTS};
use crate::common::error::Trap;
use crate::common::reg::{ArchReg, PhysReg};
use crate::config::CoreConfig;
use crate::core::arch::PhysRegFile;
use crate::core::pipeline::free_list::FreeList;
use crate::core::pipeline::hazards::{self, HazardClass, HazardInputs, StageSignals};
use crate::core::pipeline::rat::Rat;
use crate::core::pipeline::recovery::{RecoveryCause, RecoveryFsm, RecoveryStep};
use crate::core::pipeline::reservation_station::{Operand, ReservationStation, RsEntry};
use crate::core::pipeline::rob::{CommitPlan, Rob, RobHandle};
use crate::core::pipeline::signals::{
    CommitRecord, Completion, CycleOutput, PredictorUpdate, UnitStatus,
};
use crate::isa::{DecodedInst, Opcode, UnitKind};
use crate::stats::SimStats;

/// Everything decided for one cycle, computed from start-of-cycle state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CyclePlan {
    /// Hazard class in force.
    pub hazard: HazardClass,
    /// Stage signals for the class.
    pub signals: StageSignals,
    /// Completions granted a broadcast port, oldest first.
    pub accepted: Vec<Completion>,
    /// Every completion to remove from the units (accepted and stale).
    pub taken: Vec<(UnitKind, RobHandle)>,
    /// Completions discarded because their ROB entry is gone.
    pub stale: usize,
    /// Reservation slots to issue.
    pub issue: Vec<usize>,
    /// Commit decision.
    pub commit: CommitPlan,
    /// Number of rename-latch instructions to rename.
    pub rename: usize,
    /// Physical registers the renamed instructions receive, in order.
    pub phys: Vec<PhysReg>,
}

/// The scheduling core.
#[derive(Clone, Debug)]
pub struct Core {
    config: CoreConfig,
    trace: bool,
    free_list: FreeList,
    rat: Rat,
    rob: Rob,
    rs: ReservationStation,
    prf: PhysRegFile,
    recovery: RecoveryFsm,
    /// Decode-to-rename latch.
    latch: Vec<DecodedInst>,
    /// Performance counters.
    pub stats: SimStats,
}

impl Core {
    /// Creates a core in its reset state.
    ///
    /// # Arguments
    ///
    /// * `config` - Structure sizes, age bound, recovery hold and exception vector.
    /// * `trace` - Log every retired instruction at `debug` level.
    pub fn new(config: &CoreConfig, trace: bool) -> Self {
        Self {
            config: config.clone(),
            trace,
            free_list: FreeList::new(config.arch_regs, config.phys_regs),
            rat: Rat::new(config.arch_regs),
            rob: Rob::new(config.rob_size),
            rs: ReservationStation::new(config.rs_size, config.age_max),
            prf: PhysRegFile::new(config.phys_regs, config.arch_regs),
            recovery: RecoveryFsm::new(config.recovery_hold_cycles),
            latch: Vec::with_capacity(RENAME_WIDTH),
            stats: SimStats::default(),
        }
    }

    /// The free list.
    pub const fn free_list(&self) -> &FreeList {
        &self.free_list
    }

    /// The register alias table.
    pub const fn rat(&self) -> &Rat {
        &self.rat
    }

    /// The reorder buffer.
    pub const fn rob(&self) -> &Rob {
        &self.rob
    }

    /// The reservation station.
    pub const fn rs(&self) -> &ReservationStation {
        &self.rs
    }

    /// The physical register file.
    pub const fn prf(&self) -> &PhysRegFile {
        &self.prf
    }

    /// The recovery sequencer.
    pub const fn recovery(&self) -> &RecoveryFsm {
        &self.recovery
    }

    /// Instructions waiting in the rename latch.
    pub fn pending_rename(&self) -> &[DecodedInst] {
        &self.latch
    }

    /// Committed value of an architectural register.
    pub fn arch_value(&self, reg: ArchReg) -> u64 {
        self.prf.value(self.rat.committed(reg))
    }

    /// Returns true when nothing is in flight and no recovery is running.
    pub fn is_idle(&self) -> bool {
        self.latch.is_empty() && self.rob.is_empty() && self.rs.is_empty() && self.recovery.is_idle()
    }

    /// Loads a fetch group into the rename latch.
    ///
    /// The latch holds at most [`RENAME_WIDTH`] instructions; extra instructions
    /// are dropped, so callers deliver only when [`CycleOutput::fetch_ready`] is set.
    pub fn deliver(&mut self, group: impl IntoIterator<Item = DecodedInst>) {
        let room = RENAME_WIDTH - self.latch.len();
        self.latch.extend(group.into_iter().take(room));
    }

    /// Runs one cycle: `apply(evaluate(units))`.
    pub fn tick(&mut self, units: &UnitStatus) -> CycleOutput {
        let plan = self.evaluate(units);
        self.apply(plan)
    }

    /// Decides this cycle's work from the start-of-cycle state. Nothing is modified.
    pub fn evaluate(&self, units: &UnitStatus) -> CyclePlan {
        let mut plan = CyclePlan::default();

        // Completion arbitration: live results compete for the broadcast ports,
        // oldest first; stale results are drained without a port.
        let mut live: Vec<_> = Vec::new();
        for pending in &units.completed {
            let handle = pending.completion.rob;
            if self.rob.is_live(handle) {
                live.push(*pending);
            } else {
                plan.taken.push((pending.unit, handle));
                plan.stale += 1;
            }
        }
        live.sort_by_key(|p| p.completion.rob.seq);
        for pending in live.into_iter().take(WAKEUP_PORTS) {
            plan.taken.push((pending.unit, pending.completion.rob));
            plan.accepted.push(pending.completion);
        }

        // No commit while a recovery is running.
        if self.recovery.is_idle() {
            plan.commit = self.rob.plan_commit(self.config.exception_vector);
        }

        let (renameable, structural) = self.rename_capacity();
        let inputs = HazardInputs {
            recovering: self.recovery.active().map(|r| r.cause),
            committing: plan.commit.trigger.map(|r| r.cause),
            rob_full: structural.rob_full,
            rs_full: structural.rs_full,
            free_list_short: structural.free_list_short,
            alu_full: units.alu_free == 0,
            bru_full: units.bru_free == 0,
            lsu_busy: units.lsu_busy,
        };
        plan.hazard = hazards::classify(&inputs);
        plan.signals = StageSignals::for_class(plan.hazard);

        if !plan.signals.rename.stall {
            plan.rename = renameable;
            let regs = self.latch[..renameable]
                .iter()
                .filter(|i| i.renamed_dest().is_some())
                .count();
            plan.phys = self.free_list.peek(regs).unwrap_or_default();
        }

        if !plan.signals.issue.stall {
            let memory_stalled = plan.signals.memory.stall;
            let oldest_store = self.rob.oldest_store_seq();
            plan.issue = self.rs.select(
                ISSUE_WIDTH,
                |e| !e.inst.is_load() || oldest_store.is_none_or(|s| s > e.rob.seq),
                |unit| match unit {
                    UnitKind::Lsu if memory_stalled => 0,
                    _ => units.free(unit),
                },
            );
        }

        plan
    }

    /// Applies a plan produced by [`Core::evaluate`] on the same state.
    ///
    /// Order: completions (ROB ready, register write, wakeup), issue, aging,
    /// commit (with register reclamation), rename, then one recovery step.
    pub fn apply(&mut self, plan: CyclePlan) -> CycleOutput {
        let mut out = CycleOutput {
            hazard: plan.hazard,
            signals: plan.signals,
            taken: plan.taken,
            flush_pulse: self.recovery.flush_pulse(),
            ..CycleOutput::default()
        };

        for c in &plan.accepted {
            if !self.rob.complete(c) {
                continue;
            }
            if let Some(dest) = c.dest {
                self.prf.write(dest, c.result);
                let woken = self.rs.wakeup(dest, c.result);
                trace!(tag = %dest, value = c.result, woken, "wakeup");
                self.stats.wakeups += woken as u64;
            }
        }
        self.stats.stale_completions += plan.stale as u64;

        out.issued = self.rs.issue(&plan.issue);
        for op in &out.issued {
            trace!(seq = op.rob.seq, pc = op.inst.pc, unit = ?op.unit(), "issue");
        }
        self.stats.issued += out.issued.len() as u64;
        self.rs.age_tick();

        self.commit(plan.commit.retire, &mut out);

        if plan.signals.rename.flush {
            self.latch.clear();
        } else {
            self.rename(plan.rename, &plan.phys);
        }

        let step = self.recovery.step();
        self.recover(step);
        if let Some(req) = plan.commit.trigger {
            if self.recovery.trigger(req) {
                debug!(cause = ?req.cause, redirect = req.redirect, "recovery triggered");
                self.stats.recoveries += 1;
                out.redirect = Some(req.redirect);
                if let RecoveryCause::Exception { trap, .. } = req.cause {
                    self.stats.traps_taken += 1;
                    out.trap = Some(trap);
                }
            }
        }

        out.fetch_ready = self.latch.is_empty() && !plan.signals.fetch.stall;
        self.stats.cycles += 1;
        self.stats.record_hazard(plan.hazard);

        #[cfg(feature = "always-check")]
        if let Some(violation) = self.invariant_violation() {
            tracing::error!(cycle = self.stats.cycles, %violation, "core invariant violated");
        }

        out
    }

    /// How many latch instructions fit this cycle, and which structures are exhausted.
    fn rename_capacity(&self) -> (usize, Structural) {
        let group = &self.latch;
        if group.is_empty() {
            return (0, Structural::default());
        }

        let regs = group.iter().filter(|i| i.renamed_dest().is_some()).count();
        let structural = Structural {
            rob_full: self.rob.is_full(),
            rs_full: group[0].unit().is_some() && self.rs.is_full(),
            free_list_short: !self.free_list.can_allocate(regs),
        };
        if structural.free_list_short {
            return (0, structural);
        }

        let (mut rob_free, mut rs_free) = (self.rob.free_slots(), self.rs.free_slots());
        let mut n = 0;
        for inst in group {
            let needs_rs = usize::from(inst.unit().is_some());
            if rob_free == 0 || rs_free < needs_rs {
                break;
            }
            rob_free -= 1;
            rs_free -= needs_rs;
            n += 1;
        }
        (n, structural)
    }

    fn commit(&mut self, n: usize, out: &mut CycleOutput) {
        for e in self.rob.retire(n) {
            if let (Some(arch), Some(phys)) = (e.arch_dest, e.phys_dest) {
                if let Some(prev) = self.rat.commit(arch, phys) {
                    self.free_list.release(prev);
                }
            }
            let value = e.phys_dest.map_or(e.result, |p| self.prf.value(p));
            out.commits.push(CommitRecord {
                seq: e.seq,
                pc: e.pc,
                arch_dest: e.arch_dest,
                phys_dest: e.phys_dest,
                value,
            });

            if let Some(store) = e.store {
                out.stores.push(store);
            }
            if e.is_branch {
                out.predictor_updates.push(PredictorUpdate {
                    pc: e.pc,
                    taken: e.branch_taken,
                    target: e.branch_target,
                    conditional: matches!(e.inst.op, Opcode::Branch(_)),
                });
                if e.mispredicted {
                    self.stats.branch_mispredictions += 1;
                } else {
                    self.stats.branch_predictions += 1;
                }
            }

            self.stats.instructions_retired += 1;
            match e.inst.unit() {
                Some(UnitKind::Bru) => self.stats.inst_branch += 1,
                Some(UnitKind::Lsu) if e.is_store => self.stats.inst_store += 1,
                Some(UnitKind::Lsu) => self.stats.inst_load += 1,
                _ => self.stats.inst_alu += 1,
            }

            if self.trace {
                debug!(seq = e.seq, pc = format_args!("{:#x}", e.pc), inst = %e.inst, value, "commit");
            }
        }
    }

    fn rename(&mut self, n: usize, phys: &[PhysReg]) {
        let allocated = self.free_list.allocate(phys.len()).unwrap_or_default();
        debug_assert_eq!(allocated, phys, "free list changed between evaluate and apply");
        let mut regs = allocated.into_iter();

        let group: Vec<DecodedInst> = self.latch.drain(..n).collect();
        for inst in group {
            // Sources are read before this instruction's own mapping is installed.
            let op1 = self.operand(inst.src1());
            let op2 = self.operand(inst.src2());
            let dest = inst.renamed_dest().and_then(|_| regs.next());
            let exception = inst.illegal.then_some(Trap::IllegalInstruction(inst.pc));

            debug_assert!(!self.rob.is_full(), "rename past reorder buffer capacity");
            let Some(handle) = self.rob.allocate(inst, dest, exception) else {
                // Hand back this instruction's register and the rest of the group's.
                for p in dest.into_iter().chain(regs) {
                    self.free_list.release(p);
                }
                break;
            };
            if let (Some(rd), Some(p)) = (inst.renamed_dest(), dest) {
                self.rat.rename(rd, p);
                self.prf.mark_pending(p);
            }
            if exception.is_none() {
                let slot = self.rs.allocate(RsEntry::new(inst, op1, op2, dest, handle));
                debug_assert!(slot.is_some(), "rename past reservation station capacity");
            }

            debug!(seq = handle.seq, pc = format_args!("{:#x}", inst.pc), inst = %inst, dest = ?dest, "rename");
            self.stats.renamed += 1;
        }
    }

    /// Resolves a source register to an operand through the speculative map.
    fn operand(&self, src: Option<ArchReg>) -> Operand {
        let Some(reg) = src else {
            return Operand::none();
        };
        let (phys, _) = self.rat.lookup(reg);
        match self.prf.read(phys) {
            (value, true) => Operand::ready(Some(phys), value),
            (_, false) => Operand::pending(phys),
        }
    }

    fn recover(&mut self, step: RecoveryStep) {
        match step {
            RecoveryStep::None | RecoveryStep::Hold => {}
            RecoveryStep::FlushRob(cause) => {
                let squashed = match cause {
                    RecoveryCause::Mispredict { from } => self.rob.flush(from),
                    RecoveryCause::Exception { .. } => self.rob.flush_all(),
                };
                for p in squashed.iter().filter_map(|e| e.phys_dest) {
                    self.free_list.release(p);
                }
                debug!(squashed = squashed.len(), rob = self.rob.len(), "recovery: rob flushed");
                self.stats.squashed += squashed.len() as u64;
            }
            RecoveryStep::FlushRat => {
                self.rat.recover();
                debug!("recovery: rat restored");
            }
            RecoveryStep::FlushRs => {
                self.rs.clear();
                debug!("recovery: reservation station cleared");
            }
        }
    }

    /// Checks the cross-structure invariants.
    ///
    /// # Returns
    ///
    /// A description of the first violation found, or `None`.
    pub fn invariant_violation(&self) -> Option<String> {
        if !self.rob.is_consistent() {
            return Some(format!(
                "rob occupancy inconsistent: head {} tail {} count {}",
                self.rob.head(),
                self.rob.tail(),
                self.rob.len()
            ));
        }

        let phys_regs = self.prf.len();
        let mut owners = vec![0u8; phys_regs];
        for p in self.free_list.iter() {
            owners[p.0] += 1;
        }
        for e in self.rat.architectural() {
            owners[e.phys.0] += 1;
        }
        for p in self.rob.iter().filter_map(|e| e.phys_dest) {
            owners[p.0] += 1;
        }
        if let Some(p) = owners.iter().position(|&n| n != 1) {
            return Some(format!("p{p} has {} owners", owners[p]));
        }

        if self.rs.len() > self.rs.capacity() {
            return Some(format!("reservation station holds {} entries", self.rs.len()));
        }
        if let Some((slot, e)) = self.rs.iter().find(|(_, e)| e.age > self.config.age_max) {
            return Some(format!("rs slot {slot} age {} exceeds bound", e.age));
        }
        if self.recovery.is_idle() && self.rob.is_empty() && !self.rat.speculative_matches_architectural() {
            return Some("speculative map diverged with nothing in flight".to_string());
        }
        None
    }
}

/// Exhausted rename resources.
#[derive(Clone, Copy, Debug, Default)]
struct Structural {
    rob_full: bool,
    rs_full: bool,
    free_list_short: bool,
}
