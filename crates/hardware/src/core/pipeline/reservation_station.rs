//! Reservation Station and oldest-first scheduler.
//!
//! The reservation station holds renamed instructions until their operands are
//! available. It provides:
//! 1. **Allocation:** Lowest-index-first placement of up to two entries per cycle.
//! 2. **Wakeup:** Tag broadcast that marks matching pending operands ready and latches values.
//! 3. **Select:** Oldest-first choice of up to two eligible entries, ties to the lowest index.
//! 4. **Issue:** Exports the selected payloads and frees their slots in the same cycle.
//! 5. **Aging:** A saturating per-entry age counter that orders selection.
//!
//! An entry is eligible when it is valid, not yet issued and both operands are ready.

use crate::common::reg::{ArchReg, PhysReg};
use crate::core::pipeline::rob::RobHandle;
use crate::core::pipeline::signals::IssuedOp;
use crate::isa::{DecodedInst, UnitKind};

/// A source operand slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Operand {
    /// Physical register the value comes from; `None` if the instruction has no such source.
    pub tag: Option<PhysReg>,
    /// Latched value, meaningful once `ready`.
    pub value: u64,
    /// Whether the value is available.
    pub ready: bool,
}

impl Operand {
    /// An operand whose value is already known.
    pub const fn ready(tag: Option<PhysReg>, value: u64) -> Self {
        Self {
            tag,
            value,
            ready: true,
        }
    }

    /// An operand waiting on `tag`.
    pub const fn pending(tag: PhysReg) -> Self {
        Self {
            tag: Some(tag),
            value: 0,
            ready: false,
        }
    }

    /// An unused operand slot.
    pub const fn none() -> Self {
        Self::ready(None, 0)
    }

    fn wake(&mut self, tag: PhysReg, value: u64) -> bool {
        if !self.ready && self.tag == Some(tag) {
            self.value = value;
            self.ready = true;
            true
        } else {
            false
        }
    }
}

/// A single reservation station entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsEntry {
    /// Program counter.
    pub pc: u64,
    /// Instruction payload.
    pub inst: DecodedInst,
    /// First source operand.
    pub op1: Operand,
    /// Second source operand.
    pub op2: Operand,
    /// Destination tag.
    pub dest: Option<PhysReg>,
    /// Destination architectural register.
    pub dest_arch: Option<ArchReg>,
    /// Reorder buffer entry.
    pub rob: RobHandle,
    /// Cycles spent waiting, saturating.
    pub age: u8,
    /// Whether the slot is occupied.
    pub valid: bool,
    /// Whether the entry has been issued.
    pub issued: bool,
}

impl RsEntry {
    /// Builds a fresh entry (age 0, valid, not issued).
    pub fn new(
        inst: DecodedInst,
        op1: Operand,
        op2: Operand,
        dest: Option<PhysReg>,
        rob: RobHandle,
    ) -> Self {
        Self {
            pc: inst.pc,
            inst,
            op1,
            op2,
            dest,
            dest_arch: dest.and(inst.renamed_dest()),
            rob,
            age: 0,
            valid: true,
            issued: false,
        }
    }

    fn empty() -> Self {
        Self {
            valid: false,
            ..Self::new(
                DecodedInst::illegal(),
                Operand::none(),
                Operand::none(),
                None,
                RobHandle::default(),
            )
        }
    }

    /// Returns true if the entry can be selected this cycle.
    #[inline]
    pub const fn is_eligible(&self) -> bool {
        self.valid && !self.issued && self.op1.ready && self.op2.ready
    }

    /// Functional unit class the entry issues to.
    #[inline]
    pub fn unit(&self) -> UnitKind {
        self.inst.unit().unwrap_or(UnitKind::Alu)
    }

    /// The descriptor handed to the functional unit at issue.
    pub const fn to_issued(&self) -> IssuedOp {
        IssuedOp {
            inst: self.inst,
            rob: self.rob,
            dest: self.dest,
            op1: self.op1.value,
            op2: self.op2.value,
        }
    }
}

/// Fixed-capacity reservation station.
#[derive(Clone, Debug)]
pub struct ReservationStation {
    entries: Vec<RsEntry>,
    age_max: u8,
}

impl ReservationStation {
    /// Creates an empty station with `capacity` slots and ages saturating at `age_max`.
    pub fn new(capacity: usize, age_max: u8) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, RsEntry::empty);
        Self { entries, age_max }
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }

    /// Returns true if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        !self.entries.iter().any(|e| e.valid)
    }

    /// Returns true if every slot is occupied.
    pub fn is_full(&self) -> bool {
        self.entries.iter().all(|e| e.valid)
    }

    /// Number of unoccupied slots.
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.len()
    }

    /// Entry in `slot`, if occupied.
    pub fn get(&self, slot: usize) -> Option<&RsEntry> {
        self.entries.get(slot).filter(|e| e.valid)
    }

    /// Iterates over occupied slots as `(index, entry)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RsEntry)> + '_ {
        self.entries.iter().enumerate().filter(|(_, e)| e.valid)
    }

    /// Places `entry` in the lowest-indexed free slot.
    ///
    /// # Returns
    ///
    /// The slot index, or `None` when the station is full.
    pub fn allocate(&mut self, entry: RsEntry) -> Option<usize> {
        let slot = self.entries.iter().position(|e| !e.valid)?;
        self.entries[slot] = entry;
        Some(slot)
    }

    /// Broadcasts a completed destination tag.
    ///
    /// Every valid, un-issued entry with a pending operand on `tag` latches
    /// `value` and marks that operand ready. Both operands of one entry may match.
    ///
    /// # Returns
    ///
    /// The number of operands woken.
    pub fn wakeup(&mut self, tag: PhysReg, value: u64) -> usize {
        let mut woken = 0;
        for e in self.entries.iter_mut().filter(|e| e.valid && !e.issued) {
            woken += usize::from(e.op1.wake(tag, value));
            woken += usize::from(e.op2.wake(tag, value));
        }
        woken
    }

    /// Chooses up to `width` entries to issue.
    ///
    /// Candidates are eligible entries accepted by `admit` whose unit class still
    /// has room under `budget`. Each pick is the candidate with the greatest age;
    /// ties go to the lowest index. Nothing is modified.
    ///
    /// # Arguments
    ///
    /// * `width` - Issue ports available.
    /// * `admit` - Extra per-entry condition (e.g. memory ordering).
    /// * `budget` - Operations each unit class can accept this cycle.
    pub fn select(
        &self,
        width: usize,
        admit: impl Fn(&RsEntry) -> bool,
        budget: impl Fn(UnitKind) -> usize,
    ) -> Vec<usize> {
        let mut picked: Vec<usize> = Vec::with_capacity(width);
        while picked.len() < width {
            let used = |unit: UnitKind| {
                picked
                    .iter()
                    .filter(|&&s| self.entries[s].unit() == unit)
                    .count()
            };
            let mut best: Option<usize> = None;
            for (idx, e) in self.entries.iter().enumerate() {
                if !e.is_eligible() || picked.contains(&idx) || !admit(e) {
                    continue;
                }
                if used(e.unit()) >= budget(e.unit()) {
                    continue;
                }
                if best.is_none_or(|b| e.age > self.entries[b].age) {
                    best = Some(idx);
                }
            }
            match best {
                Some(idx) => picked.push(idx),
                None => break,
            }
        }
        picked
    }

    /// Issues the entries in `slots`: marks them issued, frees the slots and
    /// returns their payloads in the given order.
    pub fn issue(&mut self, slots: &[usize]) -> Vec<IssuedOp> {
        slots
            .iter()
            .filter_map(|&slot| {
                let e = self.entries.get_mut(slot)?;
                if !e.is_eligible() {
                    return None;
                }
                e.issued = true;
                e.valid = false;
                Some(e.to_issued())
            })
            .collect()
    }

    /// Ages every valid, un-issued entry by one cycle, saturating at the maximum.
    pub fn age_tick(&mut self) {
        let max = self.age_max;
        for e in self.entries.iter_mut().filter(|e| e.valid && !e.issued) {
            e.age = e.age.saturating_add(1).min(max);
        }
    }

    /// Invalidates every entry.
    pub fn clear(&mut self) {
        for e in &mut self.entries {
            e.valid = false;
        }
    }
}
