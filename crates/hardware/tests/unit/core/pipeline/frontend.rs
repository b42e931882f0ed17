//! # Fetch Unit Tests
//!
//! Group formation and the prediction attached to each fetched instruction,
//! using a mocked predictor so every query is observable.

use mockall::predicate::eq;
use rvsched_core::core::pipeline::frontend::FetchUnit;
use rvsched_core::isa::{Prediction, Program};

use crate::common::builder::program::{BASE, ProgramBuilder};
use crate::common::mocks::predictor::MockPredictor;

fn straight_line(n: usize) -> Program {
    (0..n)
        .fold(ProgramBuilder::new(), |b, i| b.addi(1, 1, i as i64))
        .build()
}

#[test]
fn straight_line_code_makes_full_groups() {
    let p = straight_line(5);
    let bp = MockPredictor::not_taken();
    let mut f = FetchUnit::new(BASE);

    let sizes: Vec<usize> = (0..4).map(|_| f.fetch(&p, &bp).len()).collect();
    assert_eq!(sizes, vec![2, 2, 1, 0]);
    assert!(f.is_drained(&p));
}

#[test]
fn taken_branch_prediction_redirects_fetch() {
    let p = ProgramBuilder::new()
        .addi(1, 0, 1)
        .bne(1, 0, -4)
        .addi(2, 0, 2)
        .build();
    let mut bp = MockPredictor::new();
    bp.expect_predict_branch()
        .with(eq(BASE + 4))
        .times(1)
        .returning(|_| (true, None));
    let mut f = FetchUnit::new(BASE);

    let g = f.fetch(&p, &bp);
    assert_eq!(g.len(), 2);
    assert_eq!(g[0].pred, Prediction::default());
    assert_eq!(
        g[1].pred,
        Prediction {
            taken: true,
            target: BASE
        },
        "direction from the predictor, target from the offset"
    );
    assert_eq!(f.pc(), BASE);
}

#[test]
fn not_taken_branch_falls_through_in_the_same_group() {
    let p = ProgramBuilder::new().beq(1, 2, 64).addi(3, 0, 3).build();
    let bp = MockPredictor::not_taken();
    let mut f = FetchUnit::new(BASE);
    let g = f.fetch(&p, &bp);
    assert_eq!(g.len(), 2);
    assert!(!g[0].pred.taken);
}

#[test]
fn jal_is_always_predicted_taken() {
    let p = ProgramBuilder::new().jal(1, 12).addi(2, 0, 2).build();
    let mut bp = MockPredictor::new();
    bp.expect_predict_branch().never();
    bp.expect_predict_btb().never();
    let mut f = FetchUnit::new(BASE);

    let g = f.fetch(&p, &bp);
    assert_eq!(g.len(), 1);
    assert_eq!(f.pc(), BASE + 12);
    assert!(f.is_drained(&p), "target lies past the program");
}

#[test]
fn jalr_follows_a_btb_hit_only() {
    let p = ProgramBuilder::new().jalr(0, 1, 0).addi(2, 0, 2).build();
    let mut bp = MockPredictor::new();
    let mut hits = [None, Some(BASE + 0x40)].into_iter();
    bp.expect_predict_btb()
        .with(eq(BASE))
        .times(2)
        .returning(move |_| hits.next().flatten());

    let mut f = FetchUnit::new(BASE);
    assert_eq!(f.fetch(&p, &bp).len(), 2, "miss falls through");

    f.redirect(BASE);
    let g = f.fetch(&p, &bp);
    assert_eq!(g.len(), 1);
    assert_eq!(g[0].pred.target, BASE + 0x40);
    assert_eq!(f.pc(), BASE + 0x40);
}

#[test]
fn illegal_records_are_fetched_without_prediction() {
    let p = ProgramBuilder::new().illegal().addi(1, 0, 1).build();
    let mut bp = MockPredictor::new();
    bp.expect_predict_branch().never();
    let mut f = FetchUnit::new(BASE);
    let g = f.fetch(&p, &bp);
    assert_eq!(g.len(), 2);
    assert!(g[0].illegal);
}

#[test]
fn redirect_outside_the_program_drains() {
    let p = straight_line(2);
    let bp = MockPredictor::not_taken();
    let mut f = FetchUnit::new(BASE);
    f.redirect(0x100);
    assert!(f.is_drained(&p));
    assert!(f.fetch(&p, &bp).is_empty());
}
