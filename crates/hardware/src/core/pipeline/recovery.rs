//! Ordered recovery state machine.
//!
//! Once a misprediction or exception commits, recovery runs one step per cycle:
//! 1. **FlushRob:** Squash the younger entries (or all entries for an exception)
//!    and return their destinations to the free list.
//! 2. **FlushRat:** Restore the speculative alias table from the architectural one.
//! 3. **FlushRs:** Clear the reservation station.
//! 4. **Complete:** Hold for a configured number of cycles with the flush pulse
//!    asserted, then return to idle.
//!
//! The order guarantees that the alias table is never restored while stale
//! reservation entries could still issue against tags that are about to be freed.

use std::fmt;

use crate::common::error::Trap;
use crate::core::pipeline::rob::RobHandle;

/// Why a recovery was started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryCause {
    /// A mispredicted branch retired; entries younger than `from` are squashed.
    Mispredict {
        /// The retired branch.
        from: RobHandle,
    },
    /// An excepting instruction reached the head; every entry is squashed.
    Exception {
        /// The exception taken.
        trap: Trap,
        /// Program counter of the excepting instruction.
        pc: u64,
    },
}

/// A recovery raised at commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryRequest {
    /// What triggered it.
    pub cause: RecoveryCause,
    /// Address fetch restarts at.
    pub redirect: u64,
}

/// Recovery FSM state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RecoveryState {
    /// No recovery in progress.
    #[default]
    Idle,
    /// Selective or full ROB flush pending.
    FlushRob,
    /// Alias table restore pending.
    FlushRat,
    /// Reservation station clear pending.
    FlushRs,
    /// Holding with the flush pulse asserted.
    Complete {
        /// Cycles left before returning to idle.
        remaining: u32,
    },
}

impl fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::FlushRob => write!(f, "FLUSH_ROB"),
            Self::FlushRat => write!(f, "FLUSH_RAT"),
            Self::FlushRs => write!(f, "FLUSH_RS"),
            Self::Complete { remaining } => write!(f, "COMPLETE({remaining})"),
        }
    }
}

/// Action the core must perform for the current recovery step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryStep {
    /// Nothing to do.
    None,
    /// Flush the ROB according to the cause.
    FlushRob(RecoveryCause),
    /// Restore the speculative alias table.
    FlushRat,
    /// Clear the reservation station.
    FlushRs,
    /// Hold; the flush pulse is asserted.
    Hold,
}

/// The recovery sequencer.
#[derive(Clone, Debug)]
pub struct RecoveryFsm {
    state: RecoveryState,
    active: Option<RecoveryRequest>,
    hold_cycles: u32,
}

impl RecoveryFsm {
    /// Creates an idle FSM whose `Complete` state lasts `hold_cycles` cycles.
    pub const fn new(hold_cycles: u32) -> Self {
        Self {
            state: RecoveryState::Idle,
            active: None,
            hold_cycles,
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> RecoveryState {
        self.state
    }

    /// Returns true when no recovery is in progress.
    #[inline]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, RecoveryState::Idle)
    }

    /// The recovery in progress, if any.
    #[inline]
    pub const fn active(&self) -> Option<RecoveryRequest> {
        self.active
    }

    /// Whether the flush pulse is asserted in the current state.
    #[inline]
    pub const fn flush_pulse(&self) -> bool {
        matches!(self.state, RecoveryState::Complete { .. })
    }

    /// Starts a recovery. Ignored (returns `false`) if one is already running.
    pub fn trigger(&mut self, request: RecoveryRequest) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.active = Some(request);
        self.state = RecoveryState::FlushRob;
        true
    }

    /// Returns the action for the current state and advances to the next one.
    pub fn step(&mut self) -> RecoveryStep {
        let (action, next) = match self.state {
            RecoveryState::Idle => (RecoveryStep::None, RecoveryState::Idle),
            RecoveryState::FlushRob => match self.active {
                Some(req) => (RecoveryStep::FlushRob(req.cause), RecoveryState::FlushRat),
                None => (RecoveryStep::None, RecoveryState::Idle),
            },
            RecoveryState::FlushRat => (RecoveryStep::FlushRat, RecoveryState::FlushRs),
            RecoveryState::FlushRs => (
                RecoveryStep::FlushRs,
                match self.hold_cycles {
                    0 => RecoveryState::Idle,
                    n => RecoveryState::Complete { remaining: n },
                },
            ),
            RecoveryState::Complete { remaining } => (
                RecoveryStep::Hold,
                match remaining {
                    0 | 1 => RecoveryState::Idle,
                    n => RecoveryState::Complete { remaining: n - 1 },
                },
            ),
        };
        self.state = next;
        if self.is_idle() {
            self.active = None;
        }
        action
    }
}
