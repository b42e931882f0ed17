//! # Branch Resolution Tests
//!
//! Direction and target of each control-transfer form, link values,
//! misprediction detection and misaligned targets.

use rstest::rstest;
use rvsched_core::common::{PhysReg, Trap};
use rvsched_core::core::pipeline::rob::RobHandle;
use rvsched_core::core::pipeline::signals::{BranchOutcome, IssuedOp};
use rvsched_core::core::units::FunctionalUnit;
use rvsched_core::core::units::bru::BranchUnit;
use rvsched_core::core::units::bru::branch_unit::resolve;
use rvsched_core::isa::{BranchCond, DecodedInst, Prediction};

fn op(inst: DecodedInst, op1: u64, op2: u64) -> IssuedOp {
    IssuedOp {
        inst,
        rob: RobHandle { slot: 0, seq: 0 },
        dest: inst.renamed_dest().map(|_| PhysReg(40)),
        op1,
        op2,
    }
}

fn predicted(inst: DecodedInst, taken: bool, target: u64) -> DecodedInst {
    DecodedInst {
        pred: Prediction { taken, target },
        ..inst
    }
}

#[rstest]
#[case(BranchCond::Eq, 5, 5, true)]
#[case(BranchCond::Ne, 5, 5, false)]
#[case(BranchCond::Lt, u64::MAX, 0, true)]
#[case(BranchCond::Ltu, u64::MAX, 0, false)]
#[case(BranchCond::Ge, 0, u64::MAX, true)]
#[case(BranchCond::Geu, 0, u64::MAX, false)]
fn conditional_directions(#[case] cond: BranchCond, #[case] a: u64, #[case] b: u64, #[case] taken: bool) {
    let inst = DecodedInst::branch(cond, 1, 2, 0x20).at(0x1000);
    let c = resolve(&op(inst, a, b));
    let outcome = c.branch.unwrap();
    assert_eq!(outcome.taken, taken);
    assert_eq!(outcome.target, 0x1020);
    assert_eq!(c.dest, None);
}

#[test]
fn correct_prediction_is_not_a_mispredict() {
    let inst = predicted(DecodedInst::bne(1, 2, 0x20).at(0x1000), true, 0x1020);
    let outcome = resolve(&op(inst, 1, 2)).branch.unwrap();
    assert_eq!(
        outcome,
        BranchOutcome {
            taken: true,
            target: 0x1020,
            mispredicted: false
        }
    );
}

#[test]
fn wrong_direction_is_a_mispredict() {
    let inst = DecodedInst::bne(1, 2, 0x20).at(0x1000);
    assert!(resolve(&op(inst, 1, 2)).branch.unwrap().mispredicted);
    let inst = predicted(DecodedInst::beq(1, 2, 0x20).at(0x1000), true, 0x1020);
    assert!(resolve(&op(inst, 1, 2)).branch.unwrap().mispredicted);
}

#[test]
fn wrong_target_is_a_mispredict() {
    let inst = predicted(DecodedInst::jalr(1, 5, 8).at(0x1000), true, 0x3000);
    let c = resolve(&op(inst, 0x2000, 0));
    let outcome = c.branch.unwrap();
    assert_eq!(outcome.target, 0x2008);
    assert!(outcome.mispredicted);
}

#[test]
fn jumps_link_the_return_address() {
    let inst = predicted(DecodedInst::jal(1, 0x40).at(0x1000), true, 0x1040);
    let c = resolve(&op(inst, 0, 0));
    assert_eq!(c.result, 0x1004);
    assert_eq!(c.dest, Some(PhysReg(40)));
    assert!(!c.branch.unwrap().mispredicted);
}

#[test]
fn jalr_clears_the_low_bit() {
    let inst = predicted(DecodedInst::jalr(0, 5, 1).at(0x1000), true, 0x2000);
    let outcome = resolve(&op(inst, 0x2000, 0)).branch.unwrap();
    assert_eq!(outcome.target, 0x2000);
    assert!(!outcome.mispredicted);
}

#[test]
fn misaligned_taken_target_traps() {
    let inst = DecodedInst::jalr(1, 5, 2).at(0x1000);
    let c = resolve(&op(inst, 0x2000, 0));
    assert_eq!(c.exception, Some(Trap::InstructionAddressMisaligned(0x2002)));
    assert_eq!(c.dest, None, "no wakeup for an excepting jump");
}

#[test]
fn misaligned_not_taken_target_is_harmless() {
    let inst = DecodedInst::beq(1, 2, 6).at(0x1000);
    let c = resolve(&op(inst, 1, 2));
    assert_eq!(c.exception, None);
}

#[test]
fn unit_releases_results_after_its_latency() {
    let mut bru = BranchUnit::new(2, 1);
    bru.issue(op(DecodedInst::jal(1, 8).at(0x1000), 0, 0));
    assert_eq!(bru.accepts(), 0);
    bru.advance();
    assert!(bru.peek_completed().is_empty());
    bru.advance();
    let done = bru.peek_completed();
    assert_eq!(done.len(), 1);
    assert!(bru.take_completed(done[0].rob).is_some());
    assert!(!bru.is_busy());
}
