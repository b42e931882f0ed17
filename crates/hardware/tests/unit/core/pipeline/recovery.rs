//! # Recovery Sequencer Tests
//!
//! The ordered flush sequence, the flush pulse, the hold length and the
//! one-recovery-at-a-time rule.

use rstest::rstest;
use rvsched_core::common::Trap;
use rvsched_core::core::pipeline::recovery::{
    RecoveryCause, RecoveryFsm, RecoveryRequest, RecoveryState, RecoveryStep,
};
use rvsched_core::core::pipeline::rob::RobHandle;

fn exception() -> RecoveryRequest {
    RecoveryRequest {
        cause: RecoveryCause::Exception {
            trap: Trap::IllegalInstruction(0x1008),
            pc: 0x1008,
        },
        redirect: 0x100,
    }
}

fn mispredict() -> RecoveryRequest {
    RecoveryRequest {
        cause: RecoveryCause::Mispredict {
            from: RobHandle { slot: 2, seq: 2 },
        },
        redirect: 0x1040,
    }
}

#[test]
fn idle_fsm_does_nothing() {
    let mut fsm = RecoveryFsm::new(2);
    assert!(fsm.is_idle());
    assert_eq!(fsm.active(), None);
    assert_eq!(fsm.step(), RecoveryStep::None);
    assert!(!fsm.flush_pulse());
}

#[test]
fn exception_walks_every_state_in_order() {
    let mut fsm = RecoveryFsm::new(2);
    assert!(fsm.trigger(exception()));
    assert_eq!(fsm.state(), RecoveryState::FlushRob);
    assert_eq!(fsm.active(), Some(exception()));

    let mut trail = Vec::new();
    while !fsm.is_idle() {
        trail.push((fsm.state(), fsm.step()));
    }
    assert_eq!(
        trail,
        vec![
            (RecoveryState::FlushRob, RecoveryStep::FlushRob(exception().cause)),
            (RecoveryState::FlushRat, RecoveryStep::FlushRat),
            (RecoveryState::FlushRs, RecoveryStep::FlushRs),
            (RecoveryState::Complete { remaining: 2 }, RecoveryStep::Hold),
            (RecoveryState::Complete { remaining: 1 }, RecoveryStep::Hold),
        ]
    );
    assert_eq!(fsm.active(), None, "request released on return to idle");
}

#[rstest]
#[case(0, 3)]
#[case(1, 4)]
#[case(4, 7)]
fn hold_length_sets_sequence_length(#[case] hold: u32, #[case] steps: usize) {
    let mut fsm = RecoveryFsm::new(hold);
    assert!(fsm.trigger(mispredict()));
    let mut n = 0;
    while !fsm.is_idle() {
        let _ = fsm.step();
        n += 1;
    }
    assert_eq!(n, steps);
}

#[test]
fn flush_pulse_only_in_complete() {
    let mut fsm = RecoveryFsm::new(1);
    assert!(fsm.trigger(mispredict()));
    let mut pulses = Vec::new();
    while !fsm.is_idle() {
        pulses.push(fsm.flush_pulse());
        let _ = fsm.step();
    }
    assert_eq!(pulses, vec![false, false, false, true]);
}

#[test]
fn second_trigger_is_refused_while_busy() {
    let mut fsm = RecoveryFsm::new(2);
    assert!(fsm.trigger(mispredict()));
    let _ = fsm.step();
    assert!(!fsm.trigger(exception()));
    assert_eq!(fsm.active(), Some(mispredict()), "running recovery is not replaced");
}

#[test]
fn states_display_in_upper_case() {
    assert_eq!(RecoveryState::Idle.to_string(), "IDLE");
    assert_eq!(RecoveryState::FlushRat.to_string(), "FLUSH_RAT");
    assert_eq!(RecoveryState::Complete { remaining: 3 }.to_string(), "COMPLETE(3)");
}
