//! # Load/Store Unit Tests
//!
//! Address generation, alignment and bounds traps, deferred store data,
//! and the single outstanding access.

use rstest::rstest;
use rvsched_core::common::{PhysReg, Trap};
use rvsched_core::core::pipeline::rob::RobHandle;
use rvsched_core::core::pipeline::signals::{IssuedOp, StoreInfo};
use rvsched_core::core::units::FunctionalUnit;
use rvsched_core::core::units::lsu::LoadStoreUnit;
use rvsched_core::core::units::lsu::memory::Memory;
use rvsched_core::isa::DecodedInst;

const MEM: usize = 0x1000;

fn op(inst: DecodedInst, op1: u64, op2: u64) -> IssuedOp {
    IssuedOp {
        inst,
        rob: RobHandle { slot: 1, seq: 1 },
        dest: inst.renamed_dest().map(|_| PhysReg(40)),
        op1,
        op2,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Memory
// ══════════════════════════════════════════════════════════

#[test]
fn memory_is_little_endian() {
    let mut m = Memory::new(64);
    m.write_u64(8, 0x0102_0304_0506_0708);
    assert_eq!(m.read_u64(8), Some(0x0102_0304_0506_0708));
    assert_eq!(m.read_u64(4), Some(0x0506_0708_0000_0000));
}

#[test]
fn memory_bounds() {
    let mut m = Memory::new(64);
    assert!(m.contains(56, 8));
    assert!(!m.contains(60, 8));
    assert_eq!(m.read_u64(64), None);
    m.write_u64(64, 1);
    assert_eq!(m.len(), 64, "out-of-range writes are dropped");
}

// ══════════════════════════════════════════════════════════
// 2. Execution
// ══════════════════════════════════════════════════════════

#[test]
fn load_reads_base_plus_offset() {
    let mut lsu = LoadStoreUnit::new(1, MEM);
    lsu.memory_mut().write_u64(0x48, 77);
    let c = lsu.execute(&op(DecodedInst::ld(1, 2, 8), 0x40, 0));
    assert_eq!(c.result, 77);
    assert_eq!(c.dest, Some(PhysReg(40)));
    assert_eq!(c.store, None);
}

#[test]
fn store_defers_the_write() {
    let lsu = LoadStoreUnit::new(1, MEM);
    let c = lsu.execute(&op(DecodedInst::sd(2, 1, -8), 0x48, 99));
    assert_eq!(c.store, Some(StoreInfo { addr: 0x40, data: 99 }));
    assert_eq!(lsu.memory().read_u64(0x40), Some(0), "memory untouched until commit");
}

#[rstest]
#[case::load_misaligned(DecodedInst::ld(1, 2, 4), Trap::LoadAddressMisaligned(0x44))]
#[case::store_misaligned(DecodedInst::sd(3, 2, 1), Trap::StoreAddressMisaligned(0x41))]
#[case::load_out_of_range(DecodedInst::ld(1, 2, 0x1000), Trap::LoadAccessFault(0x1040))]
#[case::store_out_of_range(DecodedInst::sd(3, 2, 0x1000), Trap::StoreAccessFault(0x1040))]
fn faults(#[case] inst: DecodedInst, #[case] trap: Trap) {
    let lsu = LoadStoreUnit::new(1, MEM);
    let c = lsu.execute(&op(inst, 0x40, 5));
    assert_eq!(c.exception, Some(trap));
    assert_eq!(c.dest, None);
    assert_eq!(c.store, None);
}

// ══════════════════════════════════════════════════════════
// 3. Occupancy
// ══════════════════════════════════════════════════════════

#[test]
fn one_access_at_a_time() {
    let mut lsu = LoadStoreUnit::new(3, MEM);
    assert_eq!(lsu.accepts(), 1);
    lsu.issue(op(DecodedInst::ld(1, 0, 0), 0, 0));
    assert_eq!(lsu.accepts(), 0);

    for _ in 0..2 {
        lsu.advance();
        assert!(lsu.waiting_on_memory());
        assert!(lsu.peek_completed().is_empty());
    }
    lsu.advance();
    assert!(!lsu.waiting_on_memory());
    assert_eq!(lsu.accepts(), 0, "finished result still occupies the unit");

    let rob = lsu.peek_completed()[0].rob;
    assert_eq!(lsu.take_completed(RobHandle { slot: 1, seq: 99 }), None);
    assert!(lsu.take_completed(rob).is_some());
    assert_eq!(lsu.accepts(), 1);
    assert!(!lsu.is_busy());
}
