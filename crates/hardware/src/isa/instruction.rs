//! Decoded instruction records.
//!
//! Fetch/decode is an external collaborator of the scheduling core: each cycle it
//! hands rename up to two [`DecodedInst`] records. A record carries the opcode
//! class, architectural source/destination registers, the immediate, the
//! prediction made at fetch, and a precomputed illegal-instruction flag.

use std::fmt;

use crate::common::reg::ArchReg;
use crate::isa::abi;

/// Integer ALU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AluOp {
    /// Addition (default).
    #[default]
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication (low 64 bits).
    Mul,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Shift left logical.
    Sll,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Set less than (signed).
    Slt,
    /// Set less than unsigned.
    Sltu,
}

impl AluOp {
    /// Assembly mnemonic of the register-register form.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Sll => "sll",
            Self::Srl => "srl",
            Self::Sra => "sra",
            Self::Slt => "slt",
            Self::Sltu => "sltu",
        }
    }
}

/// Conditional branch comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchCond {
    /// Branch if equal.
    Eq,
    /// Branch if not equal.
    Ne,
    /// Branch if less than (signed).
    Lt,
    /// Branch if greater or equal (signed).
    Ge,
    /// Branch if less than (unsigned).
    Ltu,
    /// Branch if greater or equal (unsigned).
    Geu,
}

impl BranchCond {
    /// Evaluates the comparison on two register values.
    pub const fn taken(self, a: u64, b: u64) -> bool {
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Lt => (a as i64) < (b as i64),
            Self::Ge => (a as i64) >= (b as i64),
            Self::Ltu => a < b,
            Self::Geu => a >= b,
        }
    }

    /// Assembly mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "beq",
            Self::Ne => "bne",
            Self::Lt => "blt",
            Self::Ge => "bge",
            Self::Ltu => "bltu",
            Self::Geu => "bgeu",
        }
    }
}

/// Opcode class of a decoded instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// Register-register ALU operation: `rd = rs1 op rs2`.
    Alu(AluOp),
    /// Register-immediate ALU operation: `rd = rs1 op imm`.
    AluImm(AluOp),
    /// Load upper immediate: `rd = imm`.
    Lui,
    /// Conditional branch to `pc + imm`.
    Branch(BranchCond),
    /// Direct jump to `pc + imm`, linking `pc + 4` into `rd`.
    Jal,
    /// Indirect jump to `(rs1 + imm) & !1`, linking `pc + 4` into `rd`.
    Jalr,
    /// Doubleword load: `rd = mem[rs1 + imm]`.
    Load,
    /// Doubleword store: `mem[rs1 + imm] = rs2`.
    Store,
    /// Encoding decode could not recognise.
    Illegal,
}

/// Functional unit class an instruction is dispatched to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Integer ALU.
    Alu,
    /// Branch resolution unit.
    Bru,
    /// Load/store unit.
    Lsu,
}

/// Branch prediction attached to an instruction at fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Prediction {
    /// Predicted direction.
    pub taken: bool,
    /// Predicted target (meaningful only when `taken`).
    pub target: u64,
}

/// A decoded instruction as delivered by fetch/decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedInst {
    /// Program counter.
    pub pc: u64,
    /// Operation.
    pub op: Opcode,
    /// First source register.
    pub rs1: ArchReg,
    /// Second source register.
    pub rs2: ArchReg,
    /// Destination register.
    pub rd: ArchReg,
    /// Sign-extended immediate.
    pub imm: i64,
    /// Precomputed illegal-instruction flag.
    pub illegal: bool,
    /// Prediction made when the instruction was fetched.
    pub pred: Prediction,
}

impl DecodedInst {
    /// Builds a record with all registers zero; the program counter is assigned by [`Program`](crate::isa::Program).
    pub const fn new(op: Opcode, rd: usize, rs1: usize, rs2: usize, imm: i64) -> Self {
        Self {
            pc: 0,
            op,
            rs1: ArchReg(rs1),
            rs2: ArchReg(rs2),
            rd: ArchReg(rd),
            imm,
            illegal: matches!(op, Opcode::Illegal),
            pred: Prediction {
                taken: false,
                target: 0,
            },
        }
    }

    /// `add rd, rs1, rs2`
    pub const fn add(rd: usize, rs1: usize, rs2: usize) -> Self {
        Self::alu(AluOp::Add, rd, rs1, rs2)
    }

    /// `sub rd, rs1, rs2`
    pub const fn sub(rd: usize, rs1: usize, rs2: usize) -> Self {
        Self::alu(AluOp::Sub, rd, rs1, rs2)
    }

    /// Register-register ALU operation.
    pub const fn alu(op: AluOp, rd: usize, rs1: usize, rs2: usize) -> Self {
        Self::new(Opcode::Alu(op), rd, rs1, rs2, 0)
    }

    /// `addi rd, rs1, imm`
    pub const fn addi(rd: usize, rs1: usize, imm: i64) -> Self {
        Self::alu_imm(AluOp::Add, rd, rs1, imm)
    }

    /// Register-immediate ALU operation.
    pub const fn alu_imm(op: AluOp, rd: usize, rs1: usize, imm: i64) -> Self {
        Self::new(Opcode::AluImm(op), rd, rs1, 0, imm)
    }

    /// `lui rd, imm` (the immediate is the final value, already shifted).
    pub const fn lui(rd: usize, imm: i64) -> Self {
        Self::new(Opcode::Lui, rd, 0, 0, imm)
    }

    /// Conditional branch with a pc-relative offset.
    pub const fn branch(cond: BranchCond, rs1: usize, rs2: usize, offset: i64) -> Self {
        Self::new(Opcode::Branch(cond), 0, rs1, rs2, offset)
    }

    /// `beq rs1, rs2, offset`
    pub const fn beq(rs1: usize, rs2: usize, offset: i64) -> Self {
        Self::branch(BranchCond::Eq, rs1, rs2, offset)
    }

    /// `bne rs1, rs2, offset`
    pub const fn bne(rs1: usize, rs2: usize, offset: i64) -> Self {
        Self::branch(BranchCond::Ne, rs1, rs2, offset)
    }

    /// `jal rd, offset`
    pub const fn jal(rd: usize, offset: i64) -> Self {
        Self::new(Opcode::Jal, rd, 0, 0, offset)
    }

    /// `jalr rd, imm(rs1)`
    pub const fn jalr(rd: usize, rs1: usize, imm: i64) -> Self {
        Self::new(Opcode::Jalr, rd, rs1, 0, imm)
    }

    /// `ld rd, imm(rs1)`
    pub const fn ld(rd: usize, rs1: usize, imm: i64) -> Self {
        Self::new(Opcode::Load, rd, rs1, 0, imm)
    }

    /// `sd rs2, imm(rs1)`
    pub const fn sd(rs2: usize, rs1: usize, imm: i64) -> Self {
        Self::new(Opcode::Store, 0, rs1, rs2, imm)
    }

    /// An unrecognised encoding.
    pub const fn illegal() -> Self {
        Self::new(Opcode::Illegal, 0, 0, 0, 0)
    }

    /// Returns a copy placed at `pc`.
    #[must_use]
    pub const fn at(mut self, pc: u64) -> Self {
        self.pc = pc;
        self
    }

    /// First register source read by the instruction, if any.
    pub const fn src1(&self) -> Option<ArchReg> {
        match self.op {
            Opcode::Alu(_)
            | Opcode::AluImm(_)
            | Opcode::Branch(_)
            | Opcode::Jalr
            | Opcode::Load
            | Opcode::Store => Some(self.rs1),
            Opcode::Lui | Opcode::Jal | Opcode::Illegal => None,
        }
    }

    /// Second register source read by the instruction, if any.
    pub const fn src2(&self) -> Option<ArchReg> {
        match self.op {
            Opcode::Alu(_) | Opcode::Branch(_) | Opcode::Store => Some(self.rs2),
            _ => None,
        }
    }

    /// Destination register written by the instruction, if any.
    ///
    /// `x0` is reported like any other register; rename treats it as a discard.
    pub const fn dest(&self) -> Option<ArchReg> {
        if self.illegal {
            return None;
        }
        match self.op {
            Opcode::Alu(_)
            | Opcode::AluImm(_)
            | Opcode::Lui
            | Opcode::Jal
            | Opcode::Jalr
            | Opcode::Load => Some(self.rd),
            Opcode::Branch(_) | Opcode::Store | Opcode::Illegal => None,
        }
    }

    /// Destination that needs a fresh physical register (non-zero `rd`).
    pub const fn renamed_dest(&self) -> Option<ArchReg> {
        match self.dest() {
            Some(rd) if !rd.is_zero() => Some(rd),
            _ => None,
        }
    }

    /// True for conditional branches and jumps.
    pub const fn is_branch(&self) -> bool {
        matches!(self.op, Opcode::Branch(_) | Opcode::Jal | Opcode::Jalr)
    }

    /// True for stores.
    pub const fn is_store(&self) -> bool {
        matches!(self.op, Opcode::Store)
    }

    /// True for loads.
    pub const fn is_load(&self) -> bool {
        matches!(self.op, Opcode::Load)
    }

    /// Functional unit this instruction executes on; `None` for illegal records.
    pub const fn unit(&self) -> Option<UnitKind> {
        if self.illegal {
            return None;
        }
        match self.op {
            Opcode::Alu(_) | Opcode::AluImm(_) | Opcode::Lui => Some(UnitKind::Alu),
            Opcode::Branch(_) | Opcode::Jal | Opcode::Jalr => Some(UnitKind::Bru),
            Opcode::Load | Opcode::Store => Some(UnitKind::Lsu),
            Opcode::Illegal => None,
        }
    }

    /// Target of a pc-relative control transfer (`pc + imm`).
    pub const fn relative_target(&self) -> u64 {
        self.pc.wrapping_add(self.imm as u64)
    }
}

impl fmt::Display for DecodedInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rd, rs1, rs2) = (abi::name(self.rd.0), abi::name(self.rs1.0), abi::name(self.rs2.0));
        match self.op {
            Opcode::Alu(op) => write!(f, "{} {rd}, {rs1}, {rs2}", op.mnemonic()),
            Opcode::AluImm(op) => write!(f, "{}i {rd}, {rs1}, {}", op.mnemonic(), self.imm),
            Opcode::Lui => write!(f, "lui {rd}, {:#x}", self.imm),
            Opcode::Branch(cond) => write!(f, "{} {rs1}, {rs2}, {}", cond.mnemonic(), self.imm),
            Opcode::Jal => write!(f, "jal {rd}, {}", self.imm),
            Opcode::Jalr => write!(f, "jalr {rd}, {}({rs1})", self.imm),
            Opcode::Load => write!(f, "ld {rd}, {}({rs1})", self.imm),
            Opcode::Store => write!(f, "sd {rs2}, {}({rs1})", self.imm),
            Opcode::Illegal => write!(f, "illegal"),
        }
    }
}
