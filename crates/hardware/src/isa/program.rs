//! Program images.
//!
//! A program is a flat sequence of decoded instructions placed at consecutive
//! word addresses starting at a base address. Programs are built directly from
//! [`DecodedInst`] constructors or loaded from a JSON description such as:
//!
//! ```json
//! [
//!     { "op": "addi", "rd": "x1", "rs1": "zero", "imm": 10 },
//!     { "op": "add",  "rd": 3,    "rs1": 1,      "rs2": 2 },
//!     { "op": "bne",  "rs1": "a0", "rs2": "zero", "imm": -8 }
//! ]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::SimError;
use crate::isa::abi;
use crate::isa::instruction::{AluOp, BranchCond, DecodedInst, Opcode};

/// Instructions addressed by program counter.
#[derive(Clone, Debug, Default)]
pub struct Program {
    base: u64,
    insts: Vec<DecodedInst>,
}

impl Program {
    /// Places `insts` at `base`, `base + 4`, ...
    pub fn new(base: u64, insts: impl IntoIterator<Item = DecodedInst>) -> Self {
        let insts = insts
            .into_iter()
            .enumerate()
            .map(|(i, inst)| inst.at(base + i as u64 * INSTRUCTION_SIZE))
            .collect();
        Self { base, insts }
    }

    /// Address of the first instruction.
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Returns the instruction at `pc`, or `None` outside the image or off word alignment.
    pub fn fetch(&self, pc: u64) -> Option<&DecodedInst> {
        let offset = pc.checked_sub(self.base)?;
        if offset % INSTRUCTION_SIZE != 0 {
            return None;
        }
        self.insts.get((offset / INSTRUCTION_SIZE) as usize)
    }

    /// Iterates over the instructions in address order.
    pub fn iter(&self) -> impl Iterator<Item = &DecodedInst> {
        self.insts.iter()
    }

    /// Parses a JSON program description.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] if the document does not match the schema and
    /// [`SimError::Program`] for unknown mnemonics or register names.
    pub fn from_json(json: &str, base: u64) -> Result<Self, SimError> {
        let specs: Vec<InstSpec> = serde_json::from_str(json).map_err(|source| SimError::Json {
            what: "program",
            source,
        })?;
        let insts = specs
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.decode(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(base, insts))
    }

    /// Reads and parses a JSON program file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Io`] if the file cannot be read, otherwise as [`Program::from_json`].
    pub fn load(path: &Path, base: u64) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json, base)
    }
}

/// Register operand in a program description: an index or a name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RegSpec {
    Index(usize),
    Name(String),
}

/// One instruction object of a program description.
#[derive(Debug, Clone, Deserialize)]
struct InstSpec {
    op: String,
    #[serde(default)]
    rd: Option<RegSpec>,
    #[serde(default)]
    rs1: Option<RegSpec>,
    #[serde(default)]
    rs2: Option<RegSpec>,
    #[serde(default)]
    imm: i64,
}

impl InstSpec {
    fn reg(&self, index: usize, spec: Option<&RegSpec>) -> Result<usize, SimError> {
        match spec {
            None => Ok(0),
            Some(RegSpec::Index(n)) if *n < abi::REG_NAMES.len() => Ok(*n),
            Some(RegSpec::Index(n)) => Err(SimError::Program {
                index,
                reason: format!("register index {n} out of range"),
            }),
            Some(RegSpec::Name(name)) => abi::parse(name).ok_or_else(|| SimError::Program {
                index,
                reason: format!("unknown register `{name}`"),
            }),
        }
    }

    fn decode(&self, index: usize) -> Result<DecodedInst, SimError> {
        let rd = self.reg(index, self.rd.as_ref())?;
        let rs1 = self.reg(index, self.rs1.as_ref())?;
        let rs2 = self.reg(index, self.rs2.as_ref())?;
        let op = parse_mnemonic(&self.op.to_ascii_lowercase()).ok_or_else(|| {
            SimError::Program {
                index,
                reason: format!("unknown mnemonic `{}`", self.op),
            }
        })?;
        Ok(DecodedInst::new(op, rd, rs1, rs2, self.imm))
    }
}

fn parse_mnemonic(op: &str) -> Option<Opcode> {
    let alu = |m: &str| match m {
        "add" => Some(AluOp::Add),
        "sub" => Some(AluOp::Sub),
        "mul" => Some(AluOp::Mul),
        "and" => Some(AluOp::And),
        "or" => Some(AluOp::Or),
        "xor" => Some(AluOp::Xor),
        "sll" => Some(AluOp::Sll),
        "srl" => Some(AluOp::Srl),
        "sra" => Some(AluOp::Sra),
        "slt" => Some(AluOp::Slt),
        "sltu" => Some(AluOp::Sltu),
        _ => None,
    };

    let opcode = match op {
        "lui" => Opcode::Lui,
        "jal" => Opcode::Jal,
        "jalr" => Opcode::Jalr,
        "ld" => Opcode::Load,
        "sd" => Opcode::Store,
        "illegal" => Opcode::Illegal,
        "beq" => Opcode::Branch(BranchCond::Eq),
        "bne" => Opcode::Branch(BranchCond::Ne),
        "blt" => Opcode::Branch(BranchCond::Lt),
        "bge" => Opcode::Branch(BranchCond::Ge),
        "bltu" => Opcode::Branch(BranchCond::Ltu),
        "bgeu" => Opcode::Branch(BranchCond::Geu),
        // `subi`/`muli` do not exist in the ISA.
        "subi" | "muli" => return None,
        // `sltiu` is the immediate form of `sltu`.
        "sltiu" => Opcode::AluImm(AluOp::Sltu),
        other => match other.strip_suffix('i').and_then(alu) {
            Some(op) => Opcode::AluImm(op),
            None => Opcode::Alu(alu(other)?),
        },
    };
    Some(opcode)
}
