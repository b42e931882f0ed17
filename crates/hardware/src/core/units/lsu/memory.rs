//! Data memory behind the load/store unit.
//!
//! A flat little-endian byte array starting at address zero. Accesses are
//! bounds-checked by the caller through [`Memory::contains`]; the raw
//! accessors assume an in-range address.

/// Byte-addressed data memory.
#[derive(Clone, Debug)]
pub struct Memory {
    bytes: Vec<u8>,
}

impl Memory {
    /// Creates a zero-filled memory of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    /// Returns the size of the memory in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for a zero-sized memory.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns true if `[addr, addr + len)` lies inside the memory.
    pub fn contains(&self, addr: u64, len: u64) -> bool {
        addr.checked_add(len)
            .is_some_and(|end| end <= self.bytes.len() as u64)
    }

    /// Reads a little-endian doubleword, or `None` when out of range.
    pub fn read_u64(&self, addr: u64) -> Option<u64> {
        let start = usize::try_from(addr).ok()?;
        let bytes = self.bytes.get(start..start.checked_add(8)?)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(bytes);
        Some(u64::from_le_bytes(word))
    }

    /// Writes a little-endian doubleword. Out-of-range writes are dropped.
    pub fn write_u64(&mut self, addr: u64, val: u64) {
        let Ok(start) = usize::try_from(addr) else {
            return;
        };
        if let Some(dest) = start
            .checked_add(8)
            .and_then(|end| self.bytes.get_mut(start..end))
        {
            dest.copy_from_slice(&val.to_le_bytes());
        }
    }
}
