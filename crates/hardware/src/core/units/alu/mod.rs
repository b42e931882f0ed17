//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer ALU the scheduler issues register-register,
//! register-immediate and `lui` operations to. All operations are 64-bit.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: Add, Sub, Mul
//! - [`logic`]:      Or, And, Xor, Slt, Sltu
//! - [`shifts`]:     Sll, Srl, Sra

/// Integer arithmetic operations (add, subtract, multiply).
pub mod arithmetic;

/// Bitwise logical and comparison operations (or, and, xor, slt).
pub mod logic;

/// Shift operations (sll, srl, sra).
pub mod shifts;

use crate::core::pipeline::rob::RobHandle;
use crate::core::pipeline::signals::{Completion, IssuedOp};
use crate::core::units::{ExecPipe, FunctionalUnit};
use crate::isa::{AluOp, Opcode, UnitKind};

/// Arithmetic Logic Unit (ALU) for integer operations.
#[derive(Debug)]
pub struct Alu;

impl Alu {
    /// Executes an integer ALU operation.
    ///
    /// # Arguments
    ///
    /// * `op` - The ALU operation to perform
    /// * `a`  - First operand
    /// * `b`  - Second operand (also used as shift amount)
    ///
    /// # Examples
    ///
    /// ```
    /// use rvsched_core::core::units::alu::Alu;
    /// use rvsched_core::isa::AluOp;
    ///
    /// assert_eq!(Alu::execute(AluOp::Add, 42, 8), 50);
    /// assert_eq!(Alu::execute(AluOp::Sll, 0x1, 4), 0x10);
    /// assert_eq!(Alu::execute(AluOp::Slt, -5_i64 as u64, 10), 1);
    /// ```
    pub const fn execute(op: AluOp, a: u64, b: u64) -> u64 {
        match op {
            AluOp::Add | AluOp::Sub | AluOp::Mul => arithmetic::execute(op, a, b),
            AluOp::Or | AluOp::And | AluOp::Xor | AluOp::Slt | AluOp::Sltu => {
                logic::execute(op, a, b)
            }
            AluOp::Sll | AluOp::Srl | AluOp::Sra => shifts::execute(op, a, b),
        }
    }

    /// Computes the result of an issued ALU-class operation.
    pub const fn result(op: &IssuedOp) -> u64 {
        match op.inst.op {
            Opcode::Alu(alu) => Self::execute(alu, op.op1, op.op2),
            Opcode::AluImm(alu) => Self::execute(alu, op.op1, op.inst.imm as u64),
            Opcode::Lui => op.inst.imm as u64,
            _ => 0,
        }
    }
}

/// Pipelined integer unit.
///
/// Results are computed at issue and broadcast `latency` cycles later.
#[derive(Clone, Debug)]
pub struct AluUnit {
    pipe: ExecPipe,
}

impl AluUnit {
    /// Creates an ALU with the given result latency and in-flight capacity.
    pub fn new(latency: u64, capacity: usize) -> Self {
        Self {
            pipe: ExecPipe::new(latency, capacity),
        }
    }
}

impl FunctionalUnit for AluUnit {
    fn kind(&self) -> UnitKind {
        UnitKind::Alu
    }

    fn accepts(&self) -> usize {
        self.pipe.accepts()
    }

    fn issue(&mut self, op: IssuedOp) {
        self.pipe.push(Completion::result(&op, Alu::result(&op)));
    }

    fn advance(&mut self) {
        self.pipe.advance();
    }

    fn peek_completed(&self) -> Vec<Completion> {
        self.pipe.completed()
    }

    fn take_completed(&mut self, rob: RobHandle) -> Option<Completion> {
        self.pipe.take(rob)
    }

    fn is_busy(&self) -> bool {
        self.pipe.is_busy()
    }
}
