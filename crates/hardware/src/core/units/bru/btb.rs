//! Branch Target Buffer (BTB).
//!
//! The BTB is a direct-mapped cache that stores target addresses for control flow
//! instructions. It allows fetch to predict the target of an indirect jump
//! before its source register has been read.

/// A filled BTB slot: the full program counter of the jump (used as the tag)
/// and its last resolved target.
#[derive(Clone, Copy, Debug)]
struct BtbEntry {
    tag: u64,
    target: u64,
}

/// Branch Target Buffer structure.
#[derive(Clone, Debug)]
pub struct Btb {
    table: Vec<Option<BtbEntry>>,
    mask: usize,
}

impl Btb {
    /// Creates an empty BTB of `size` slots (a power of two, checked by
    /// [`Config::validate`](crate::config::Config::validate)).
    pub fn new(size: usize) -> Self {
        debug_assert!(size.is_power_of_two());
        Self {
            table: vec![None; size],
            mask: size - 1,
        }
    }

    /// Word index of `pc` masked to the table size.
    fn index(&self, pc: u64) -> usize {
        ((pc >> 2) as usize) & self.mask
    }

    /// Predicted target for the jump at `pc`; `None` on an empty slot or a
    /// slot owned by another jump.
    pub fn lookup(&self, pc: u64) -> Option<u64> {
        self.table[self.index(pc)]
            .filter(|e| e.tag == pc)
            .map(|e| e.target)
    }

    /// Records `target` for `pc`, evicting any aliasing entry.
    pub fn update(&mut self, pc: u64, target: u64) {
        let idx = self.index(pc);
        self.table[idx] = Some(BtbEntry { tag: pc, target });
    }
}
