//! # End-to-End Scenarios
//!
//! Runs small programs through the full machine (fetch, core, functional
//! units, memory and predictor) and checks the committed architectural
//! state. Core invariants are asserted after every cycle by the harness.

use mockall::predicate::eq;
use pretty_assertions::assert_eq;
use rvsched_core::common::{SimError, Trap};
use rvsched_core::config::{BranchPredictor as PredictorKind, Config};
use rvsched_core::core::units::bru::BranchPredictor;
use rvsched_core::isa::{DecodedInst, Program};

use crate::common::builder::program::{BASE, ProgramBuilder};
use crate::common::harness::TestContext;
use crate::common::mocks::predictor::MockPredictor;

fn config(f: impl FnOnce(&mut Config)) -> Config {
    let mut config = Config::default();
    f(&mut config);
    config
}

// ══════════════════════════════════════════════════════════
// 1. Data flow
// ══════════════════════════════════════════════════════════

#[test]
fn dependent_alu_chain() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 10)
        .addi(2, 0, 20)
        .add(3, 1, 2)
        .sub(4, 3, 1)
        .build();
    let mut ctx = TestContext::new(program);
    let summary = ctx.run();

    assert_eq!((ctx.reg(1), ctx.reg(2), ctx.reg(3), ctx.reg(4)), (10, 20, 30, 20));
    assert_eq!(summary.instructions, 4);
    assert_eq!(summary.trap, None);
    assert_eq!(ctx.sim.core().free_list().available(), 32, "every register reclaimed");
    let stats = ctx.sim.stats();
    assert_eq!(
        [
            stats.stalls_structural,
            stats.stalls_resource,
            stats.stalls_memory,
            stats.stalls_mispredict,
            stats.stalls_exception,
        ],
        [0; 5],
        "the chain runs without stalls"
    );
    assert_eq!(
        ctx.commits.iter().map(|c| c.pc).collect::<Vec<_>>(),
        vec![BASE, BASE + 4, BASE + 8, BASE + 12]
    );
}

#[test]
fn commits_are_in_program_order() {
    let program = ProgramBuilder::new()
        .ld(1, 0, 0x80)
        .addi(2, 0, 2)
        .addi(3, 0, 3)
        .addi(4, 1, 4)
        .build();
    let mut ctx = TestContext::new(program);
    let _ = ctx.run();
    let seqs: Vec<u64> = ctx.commits.iter().map(|c| c.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]), "{seqs:?}");
    assert_eq!(seqs.len(), 4);
}

#[test]
fn slow_load_does_not_hold_back_independent_work() {
    let program = ProgramBuilder::new()
        .ld(1, 0, 0x80)
        .addi(2, 0, 2)
        .build();
    let mut ctx = TestContext::with_config(config(|c| c.units.lsu_latency = 5), program);
    let _ = ctx.run();

    let both_issued = ctx.outputs.iter().any(|out| {
        out.issued.iter().map(|op| op.inst.pc).collect::<Vec<_>>() == vec![BASE, BASE + 4]
    });
    assert!(both_issued, "load and add leave the station together");
    assert!(ctx.sim.stats().stalls_memory > 0);
    assert_eq!(ctx.reg(2), 2);
}

#[test]
fn writes_to_x0_are_discarded() {
    let program = ProgramBuilder::new()
        .addi(0, 0, 5)
        .add(1, 0, 0)
        .addi(2, 0, 7)
        .build();
    let mut ctx = TestContext::new(program);
    let _ = ctx.run();
    assert_eq!((ctx.reg(0), ctx.reg(1), ctx.reg(2)), (0, 0, 7));
}

#[test]
fn store_then_load_through_memory() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 99)
        .sd(1, 0, 0x80)
        .ld(2, 0, 0x80)
        .ld(3, 0, 0x200)
        .build();
    let mut ctx = TestContext::new(program);
    ctx.sim.memory_mut().write_u64(0x200, 1234);
    let _ = ctx.run();

    assert_eq!(ctx.reg(2), 99, "the load waits for the older store to commit");
    assert_eq!(ctx.reg(3), 1234);
    assert_eq!(ctx.sim.memory().read_u64(0x80), Some(99));
}

#[test]
fn wrong_path_store_never_reaches_memory() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 1)
        .bne(1, 0, 12)
        .addi(2, 0, 55)
        .sd(2, 0, 0x80)
        .addi(3, 0, 3)
        .build();
    let mut ctx = TestContext::new(program);
    let _ = ctx.run();
    assert_eq!(ctx.sim.memory().read_u64(0x80), Some(0));
    assert_eq!(ctx.reg(3), 3);
}

// ══════════════════════════════════════════════════════════
// 2. Control flow
// ══════════════════════════════════════════════════════════

#[test]
fn mispredicted_branch_squashes_wrong_path() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 1)
        .bne(1, 0, 12)
        .addi(2, 0, 2)
        .addi(3, 0, 3)
        .addi(4, 0, 42)
        .build();

    let mut bp = MockPredictor::new();
    bp.expect_predict_branch().returning(|_| (false, None));
    bp.expect_predict_btb().returning(|_| None);
    bp.expect_update_branch()
        .with(eq(BASE + 4), eq(true), eq(Some(BASE + 16)))
        .times(1)
        .returning(|_, _, _| ());
    bp.expect_update_btb().never();

    let mut ctx = TestContext::with_predictor(Config::default(), program, bp);
    let _ = ctx.run();

    assert_eq!((ctx.reg(2), ctx.reg(3), ctx.reg(4)), (0, 0, 42));
    let stats = ctx.sim.stats();
    assert_eq!(stats.branch_mispredictions, 1);
    assert!(stats.squashed >= 2, "both wrong-path instructions were in flight");
    assert!(stats.stalls_mispredict > 0);
    assert_eq!(
        ctx.commits.iter().map(|c| c.pc).collect::<Vec<_>>(),
        vec![BASE, BASE + 4, BASE + 16]
    );
    assert!(ctx.sim.core().rat().speculative_matches_architectural());
}

#[test]
fn correctly_predicted_branch_costs_no_recovery() {
    let program = ProgramBuilder::new()
        .beq(1, 2, 8)
        .addi(3, 0, 3)
        .addi(4, 0, 4)
        .build();
    let mut bp = MockPredictor::new();
    bp.expect_predict_branch().returning(|_| (true, None));
    bp.expect_update_branch()
        .with(eq(BASE), eq(true), eq(Some(BASE + 8)))
        .times(1)
        .returning(|_, _, _| ());

    let mut ctx = TestContext::with_predictor(Config::default(), program, bp);
    let _ = ctx.run();
    assert_eq!((ctx.reg(3), ctx.reg(4)), (0, 4));
    assert_eq!(ctx.sim.stats().recoveries, 0);
    assert_eq!(ctx.sim.stats().squashed, 0);
}

#[test]
fn jal_links_and_skips() {
    let program = ProgramBuilder::new()
        .jal(1, 8)
        .addi(2, 0, 1)
        .addi(3, 0, 3)
        .build();
    let mut bp = MockPredictor::new();
    bp.expect_update_btb()
        .with(eq(BASE), eq(BASE + 8))
        .times(1)
        .returning(|_, _| ());
    bp.expect_update_branch().never();

    let mut ctx = TestContext::with_predictor(Config::default(), program, bp);
    let _ = ctx.run();
    assert_eq!(ctx.reg(1), BASE + 4);
    assert_eq!((ctx.reg(2), ctx.reg(3)), (0, 3));
    assert_eq!(ctx.sim.stats().branch_mispredictions, 0);
}

#[test]
fn jalr_btb_miss_is_recovered() {
    let program = ProgramBuilder::new()
        .addi(5, 0, (BASE + 16) as i64)
        .jalr(1, 5, 0)
        .addi(2, 0, 1)
        .addi(3, 0, 2)
        .addi(4, 0, 4)
        .build();
    let mut ctx = TestContext::new(program);
    let _ = ctx.run();
    assert_eq!(ctx.reg(1), BASE + 8);
    assert_eq!((ctx.reg(2), ctx.reg(3), ctx.reg(4)), (0, 0, 4));
    assert_eq!(ctx.sim.stats().branch_mispredictions, 1);
    assert_eq!(ctx.sim.predictor().predict_btb(BASE + 4), Some(BASE + 16));
}

fn countdown_loop() -> Program {
    ProgramBuilder::new()
        .addi(10, 0, 8)
        .addi(11, 0, 0)
        .add(11, 11, 10)
        .addi(10, 10, -1)
        .bne(10, 0, -8)
        .addi(12, 11, 1)
        .build()
}

#[test]
fn loop_under_static_prediction() {
    let mut ctx = TestContext::new(countdown_loop());
    let _ = ctx.run();
    assert_eq!((ctx.reg(11), ctx.reg(12)), (36, 37));
    let stats = ctx.sim.stats();
    assert_eq!(stats.branch_mispredictions, 7, "every taken back-edge");
    assert_eq!(stats.branch_predictions, 1);
}

#[test]
fn loop_under_bimodal_prediction() {
    let cfg = config(|c| c.predictor.kind = PredictorKind::Bimodal);
    let mut ctx = TestContext::with_config(cfg, countdown_loop());
    let _ = ctx.run();
    assert_eq!((ctx.reg(11), ctx.reg(12)), (36, 37));
    assert_eq!(
        ctx.sim.stats().branch_mispredictions,
        2,
        "first back-edge and loop exit"
    );
}

// ══════════════════════════════════════════════════════════
// 3. Exceptions
// ══════════════════════════════════════════════════════════

#[test]
fn illegal_instruction_traps_precisely() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 5)
        .illegal()
        .addi(2, 0, 7)
        .build();
    let mut ctx = TestContext::new(program);
    let summary = ctx.run();

    assert_eq!(summary.trap, Some(Trap::IllegalInstruction(BASE + 4)));
    assert_eq!(ctx.sim.last_trap(), summary.trap);
    assert_eq!((ctx.reg(1), ctx.reg(2)), (5, 0));
    assert_eq!(summary.instructions, 1);
    assert_eq!(ctx.sim.stats().traps_taken, 1);
    assert!(ctx.sim.stats().stalls_exception > 0);
    assert_eq!(ctx.sim.fetch().pc(), 0x100, "fetch restarted at the exception vector");
}

#[test]
fn exception_vector_inside_the_program() {
    let program = ProgramBuilder::new()
        .illegal()
        .addi(1, 0, 1)
        .addi(2, 0, 2)
        .addi(3, 0, 3)
        .addi(4, 0, 4)
        .build();
    let cfg = config(|c| c.core.exception_vector = BASE + 12);
    let mut ctx = TestContext::with_config(cfg, program);
    let _ = ctx.run();
    assert_eq!(
        (ctx.reg(1), ctx.reg(2), ctx.reg(3), ctx.reg(4)),
        (0, 0, 3, 4),
        "execution resumes at the handler"
    );
}

#[test]
fn misaligned_load_traps() {
    let program = ProgramBuilder::new().ld(1, 0, 4).addi(2, 0, 2).build();
    let mut ctx = TestContext::new(program);
    let summary = ctx.run();
    assert_eq!(summary.trap, Some(Trap::LoadAddressMisaligned(4)));
    assert_eq!(ctx.reg(2), 0);
}

#[test]
fn faulting_store_leaves_memory_untouched() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 7)
        .sd(1, 0, 0x10000)
        .build();
    let mut ctx = TestContext::new(program);
    let summary = ctx.run();
    assert_eq!(summary.trap, Some(Trap::StoreAccessFault(0x10000)));
    assert_eq!(ctx.reg(1), 7);
}

#[test]
fn exception_in_wrong_path_is_ignored() {
    let program = ProgramBuilder::new()
        .beq(0, 0, 8)
        .illegal()
        .addi(1, 0, 1)
        .build();
    let mut ctx = TestContext::new(program);
    let summary = ctx.run();
    assert_eq!(summary.trap, None);
    assert_eq!(ctx.reg(1), 1);
}

// ══════════════════════════════════════════════════════════
// 4. Hazards and limits
// ══════════════════════════════════════════════════════════

#[test]
fn small_station_causes_structural_stalls() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 1)
        .repeat(8, DecodedInst::add(1, 1, 1))
        .build();
    let mut ctx = TestContext::with_config(config(|c| c.core.rs_size = 2), program);
    let _ = ctx.run();
    assert_eq!(ctx.reg(1), 256);
    assert!(ctx.sim.stats().stalls_structural > 0);
}

#[test]
fn single_alu_slot_causes_resource_stalls() {
    let program = ProgramBuilder::new()
        .repeat(6, DecodedInst::addi(1, 0, 1))
        .build();
    let mut ctx = TestContext::with_config(config(|c| c.units.alu_capacity = 1), program);
    let _ = ctx.run();
    assert_eq!(ctx.reg(1), 1);
    assert!(ctx.sim.stats().stalls_resource > 0);
}

#[test]
fn tiny_machine_matches_default_results() {
    let program = ProgramBuilder::new()
        .addi(1, 0, 3)
        .addi(2, 0, 4)
        .add(3, 1, 2)
        .sd(3, 0, 0x40)
        .ld(4, 0, 0x40)
        .add(5, 4, 3)
        .sub(6, 5, 1)
        .build();
    let tiny = config(|c| {
        c.core.phys_regs = 34;
        c.core.rob_size = 2;
        c.core.rs_size = 2;
        c.core.recovery_hold_cycles = 0;
        c.units.alu_capacity = 1;
        c.units.bru_capacity = 1;
    });

    let mut small = TestContext::with_config(tiny, program.clone());
    let mut big = TestContext::new(program);
    let _ = small.run();
    let _ = big.run();
    assert_eq!(small.sim.registers(), big.sim.registers());
    assert_eq!(small.reg(6), 11);
    assert!(small.sim.stats().cycles > big.sim.stats().cycles);
}

#[test]
fn cycle_budget_is_enforced() {
    let program = ProgramBuilder::new()
        .repeat(20, DecodedInst::addi(1, 1, 1))
        .build();
    let mut ctx = TestContext::new(program);
    let err = ctx.sim.run(3).unwrap_err();
    assert!(matches!(err, SimError::CycleLimit(3)), "got {err:?}");
    assert_eq!(ctx.sim.stats().cycles, 3);
}

#[test]
fn empty_program_finishes_immediately() {
    let mut ctx = TestContext::new(ProgramBuilder::new().build());
    let summary = ctx.run();
    assert_eq!(summary.cycles, 0);
    assert_eq!(summary.instructions, 0);
    assert!(ctx.commits.is_empty());
}
