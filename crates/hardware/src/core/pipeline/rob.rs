//! Reorder Buffer (ROB) for in-order commit.
//!
//! The ROB is a circular buffer that tracks in-flight instructions from rename
//! through commit. It provides:
//! 1. **Allocation:** Assigns each renamed instruction a slot and a sequence number.
//! 2. **Completion:** Records results, exceptions and branch outcomes as units finish.
//! 3. **In-order Commit:** Retires up to two ready instructions from the head in program order.
//! 4. **Flush:** Squashes entries younger than a given instruction, or everything.
//!
//! Entries are addressed by [`RobHandle`], which pairs the slot index with the
//! sequence number of the instruction that owns it. A completion that arrives after
//! its entry was squashed (or after the slot was reused) carries a stale handle and
//! is ignored.

use crate::common::constants::{COMMIT_WIDTH, INSTRUCTION_SIZE};
use crate::common::error::Trap;
use crate::common::reg::{ArchReg, PhysReg};
use crate::core::pipeline::recovery::{RecoveryCause, RecoveryRequest};
use crate::core::pipeline::signals::{Completion, StoreInfo};
use crate::isa::DecodedInst;

/// Stable reference to a ROB entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct RobHandle {
    /// Slot index in the circular buffer.
    pub slot: usize,
    /// Program-order sequence number of the owning instruction.
    pub seq: u64,
}

/// A single entry in the Reorder Buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RobEntry {
    /// Program-order sequence number.
    pub seq: u64,
    /// The instruction.
    pub inst: DecodedInst,
    /// Program counter of the instruction.
    pub pc: u64,
    /// Architectural destination register, if renamed.
    pub arch_dest: Option<ArchReg>,
    /// Physical destination register, if renamed.
    pub phys_dest: Option<PhysReg>,
    /// Result value (ALU output, load data or link address).
    pub result: u64,
    /// Whether the instruction is a branch or jump.
    pub is_branch: bool,
    /// Whether the instruction is a store.
    pub is_store: bool,
    /// Exception to take when this entry reaches the head.
    pub exception: Option<Trap>,
    /// Resolved branch direction.
    pub branch_taken: bool,
    /// Resolved branch target.
    pub branch_target: u64,
    /// Whether the fetch-time prediction was wrong.
    pub mispredicted: bool,
    /// Store address and data, once computed.
    pub store: Option<StoreInfo>,
    /// Whether execution has completed.
    pub ready: bool,
    /// Whether this slot is occupied.
    pub valid: bool,
}

impl RobEntry {
    fn new(seq: u64, inst: DecodedInst, phys_dest: Option<PhysReg>, exception: Option<Trap>) -> Self {
        Self {
            seq,
            inst,
            pc: inst.pc,
            arch_dest: phys_dest.and(inst.renamed_dest()),
            phys_dest,
            result: 0,
            is_branch: inst.is_branch(),
            is_store: inst.is_store(),
            exception,
            branch_taken: false,
            branch_target: 0,
            mispredicted: false,
            store: None,
            // Nothing will execute an instruction that already carries an exception.
            ready: exception.is_some(),
            valid: true,
        }
    }

    fn empty() -> Self {
        let mut e = Self::new(0, DecodedInst::illegal(), None, None);
        e.valid = false;
        e
    }

    /// Address execution continues at after this branch retires.
    pub const fn resolved_next_pc(&self) -> u64 {
        if self.branch_taken {
            self.branch_target
        } else {
            self.pc.wrapping_add(INSTRUCTION_SIZE)
        }
    }
}

/// Result of examining the commit window at the start of a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct CommitPlan {
    /// Number of head entries that retire.
    pub retire: usize,
    /// Recovery raised by the window: an exception at an entry that does not
    /// retire, or a misprediction on the last entry that does.
    pub trigger: Option<RecoveryRequest>,
}

/// Reorder Buffer: circular buffer for in-order commit.
#[derive(Clone, Debug)]
pub struct Rob {
    /// Fixed-size entry array.
    entries: Vec<RobEntry>,
    /// Index of the oldest entry (commit point).
    head: usize,
    /// Index where the next entry will be allocated.
    tail: usize,
    /// Number of valid entries.
    count: usize,
    /// Sequence number given to the next allocation.
    next_seq: u64,
}

impl Rob {
    /// Creates an empty ROB with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, RobEntry::empty);
        Self {
            entries,
            head: 0,
            tail: 0,
            count: 0,
            next_seq: 0,
        }
    }

    /// Returns the ROB capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of occupied entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the ROB is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the ROB is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Returns the number of free slots.
    #[inline]
    pub fn free_slots(&self) -> usize {
        self.entries.len() - self.count
    }

    /// Slot index of the oldest entry.
    #[inline]
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Slot index the next allocation will use.
    #[inline]
    pub const fn tail(&self) -> usize {
        self.tail
    }

    #[inline]
    fn wrap(&self, idx: usize) -> usize {
        idx % self.entries.len()
    }

    /// Allocates a new entry at the tail. Returns `None` if the ROB is full.
    ///
    /// # Arguments
    ///
    /// * `inst` - The renamed instruction.
    /// * `phys_dest` - Physical destination, if the instruction was given one.
    /// * `exception` - Exception detected before execution (e.g. illegal
    ///   instruction). Such entries are ready immediately.
    pub fn allocate(
        &mut self,
        inst: DecodedInst,
        phys_dest: Option<PhysReg>,
        exception: Option<Trap>,
    ) -> Option<RobHandle> {
        if self.is_full() {
            return None;
        }

        let handle = RobHandle {
            slot: self.tail,
            seq: self.next_seq,
        };
        self.entries[self.tail] = RobEntry::new(handle.seq, inst, phys_dest, exception);
        self.next_seq += 1;
        self.tail = self.wrap(self.tail + 1);
        self.count += 1;
        Some(handle)
    }

    /// Returns true if `handle` still names a live entry.
    #[inline]
    pub fn is_live(&self, handle: RobHandle) -> bool {
        self.entries
            .get(handle.slot)
            .is_some_and(|e| e.valid && e.seq == handle.seq)
    }

    /// Returns the entry named by `handle`, or `None` if the handle is stale.
    pub fn get(&self, handle: RobHandle) -> Option<&RobEntry> {
        self.is_live(handle).then(|| &self.entries[handle.slot])
    }

    /// Records a completion on its entry and marks it ready.
    ///
    /// # Returns
    ///
    /// `false` if the completion's handle is stale; nothing is changed.
    pub fn complete(&mut self, c: &Completion) -> bool {
        if !self.is_live(c.rob) {
            return false;
        }
        let entry = &mut self.entries[c.rob.slot];
        entry.result = c.result;
        entry.exception = c.exception;
        if let Some(b) = c.branch {
            entry.branch_taken = b.taken;
            entry.branch_target = b.target;
            entry.mispredicted = b.mispredicted;
        }
        entry.store = c.store;
        entry.ready = true;
        true
    }

    /// Returns a reference to the head entry (oldest), if the ROB is non-empty.
    pub fn peek_head(&self) -> Option<&RobEntry> {
        if self.count == 0 {
            None
        } else {
            Some(&self.entries[self.head])
        }
    }

    /// Handle of the head entry.
    pub fn head_handle(&self) -> Option<RobHandle> {
        self.peek_head().map(|e| RobHandle {
            slot: self.head,
            seq: e.seq,
        })
    }

    /// Decides what the commit stage does this cycle without changing anything.
    ///
    /// Up to [`COMMIT_WIDTH`] head entries are examined in order and the window
    /// stops at the first entry that is not ready. An excepting entry does not
    /// retire and raises an exception recovery. A mispredicted branch retires
    /// and raises a recovery that squashes everything younger; nothing after it
    /// retires in the same cycle.
    pub fn plan_commit(&self, exception_vector: u64) -> CommitPlan {
        let mut plan = CommitPlan::default();
        for i in 0..COMMIT_WIDTH.min(self.count) {
            let slot = self.wrap(self.head + i);
            let e = &self.entries[slot];
            if !(e.valid && e.ready) {
                break;
            }
            if let Some(trap) = e.exception {
                plan.trigger = Some(RecoveryRequest {
                    cause: RecoveryCause::Exception { trap, pc: e.pc },
                    redirect: exception_vector,
                });
                break;
            }
            plan.retire += 1;
            if e.mispredicted {
                plan.trigger = Some(RecoveryRequest {
                    cause: RecoveryCause::Mispredict {
                        from: RobHandle { slot, seq: e.seq },
                    },
                    redirect: e.resolved_next_pc(),
                });
                break;
            }
        }
        plan
    }

    /// Retires `n` entries from the head and returns them oldest first.
    ///
    /// Callers pass the count from [`Rob::plan_commit`]; retirement stops early
    /// at any entry that is not valid and ready.
    pub fn retire(&mut self, n: usize) -> Vec<RobEntry> {
        let mut retired = Vec::with_capacity(n);
        for _ in 0..n {
            match self.commit_head() {
                Some(e) => retired.push(e),
                None => break,
            }
        }
        retired
    }

    /// Commits (retires) the head entry if it is valid and ready.
    pub fn commit_head(&mut self) -> Option<RobEntry> {
        let head = &mut self.entries[self.head];
        if self.count == 0 || !(head.valid && head.ready) {
            return None;
        }
        head.valid = false;
        let committed = head.clone();
        self.head = self.wrap(self.head + 1);
        self.count -= 1;
        Some(committed)
    }

    /// Flushes every entry strictly younger than `from`.
    ///
    /// `from` and all older entries are kept and the tail is reset to just past
    /// the youngest survivor. If `from` has already retired, every in-flight
    /// entry is younger and the buffer empties.
    ///
    /// # Returns
    ///
    /// The squashed entries, oldest first.
    pub fn flush(&mut self, from: RobHandle) -> Vec<RobEntry> {
        let mut squashed = Vec::new();
        while self.count > 0 {
            let last = self.wrap(self.tail + self.entries.len() - 1);
            if self.entries[last].seq <= from.seq {
                break;
            }
            self.entries[last].valid = false;
            squashed.push(self.entries[last].clone());
            self.tail = last;
            self.count -= 1;
        }
        squashed.reverse();
        squashed
    }

    /// Flushes all entries from the ROB.
    ///
    /// # Returns
    ///
    /// The squashed entries, oldest first.
    pub fn flush_all(&mut self) -> Vec<RobEntry> {
        let squashed = self.iter().cloned().collect();
        for entry in &mut self.entries {
            entry.valid = false;
        }
        self.tail = self.head;
        self.count = 0;
        squashed
    }

    /// Sequence number of the oldest store still in flight.
    pub fn oldest_store_seq(&self) -> Option<u64> {
        self.iter().find(|e| e.is_store).map(|e| e.seq)
    }

    /// Iterates over the valid entries from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &RobEntry> + '_ {
        (0..self.count)
            .map(move |i| &self.entries[self.wrap(self.head + i)])
            .filter(|e| e.valid)
    }

    /// Checks the occupancy invariants: `count == (tail - head) mod R`, every
    /// slot in `[head, tail)` valid, every other slot invalid, and sequence
    /// numbers strictly increasing from head to tail.
    pub fn is_consistent(&self) -> bool {
        let cap = self.entries.len();
        let span = (self.tail + cap - self.head) % cap;
        let span_ok = if self.count == cap {
            self.head == self.tail
        } else {
            span == self.count
        };
        let valid_ok = (0..cap).all(|i| {
            let offset = (i + cap - self.head) % cap;
            self.entries[i].valid == (offset < self.count)
        });
        let order_ok = self
            .iter()
            .zip(self.iter().skip(1))
            .all(|(a, b)| a.seq < b.seq);
        span_ok && valid_ok && order_ok
    }
}
