//! Instruction formats, classes and operand applicability.

use serde::{Serialize, Serializer};
use std::fmt;

/// Instruction set an opcode belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InstructionClass {
    /// RV32I base integer instruction set.
    #[serde(rename = "RV32I")]
    Rv32i,
}

impl fmt::Display for InstructionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionClass::Rv32i => write!(f, "RV32I"),
        }
    }
}

/// Encoding layout of an instruction word.
///
/// The format alone decides which operand fields exist in the word and how
/// the immediate bits are scattered. Serializes as its display name, e.g.
/// `"ConditionalJump(B)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionFormat {
    /// R-type: register-register operations.
    Register,
    /// I-type: loads, short immediates and `jalr`.
    Load,
    /// S-type: stores.
    Store,
    /// B-type: conditional branches.
    ConditionalJump,
    /// U-type: 20-bit upper immediates.
    LongImmediate,
    /// J-type: `jal`.
    UnconditionalJump,
}

/// Operand fields an instruction may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operand {
    /// Destination register.
    Rd,
    /// First source register.
    Rs1,
    /// Second source register.
    Rs2,
    /// Reconstructed immediate.
    Imm,
}

impl Operand {
    /// All operands in the order they are printed.
    pub const ALL: [Operand; 4] = [Operand::Rd, Operand::Rs1, Operand::Rs2, Operand::Imm];
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operand::Rd => "rd",
            Operand::Rs1 => "rs1",
            Operand::Rs2 => "rs2",
            Operand::Imm => "imm",
        };
        f.write_str(name)
    }
}

impl InstructionFormat {
    /// Every format.
    pub const ALL: [InstructionFormat; 6] = [
        InstructionFormat::Register,
        InstructionFormat::Load,
        InstructionFormat::Store,
        InstructionFormat::ConditionalJump,
        InstructionFormat::LongImmediate,
        InstructionFormat::UnconditionalJump,
    ];

    /// Whether words of this format encode `operand`.
    #[must_use]
    pub const fn has(self, operand: Operand) -> bool {
        use InstructionFormat::{
            ConditionalJump, Load, LongImmediate, Register, Store, UnconditionalJump,
        };
        use Operand::{Imm, Rd, Rs1, Rs2};

        match (self, operand) {
            (Register | Load | LongImmediate | UnconditionalJump, Rd)
            | (Register | Load | Store | ConditionalJump, Rs1)
            | (Register | Store | ConditionalJump, Rs2)
            | (Load | Store | ConditionalJump | LongImmediate | UnconditionalJump, Imm) => true,
            (Store | ConditionalJump, Rd)
            | (LongImmediate | UnconditionalJump, Rs1)
            | (Load | LongImmediate | UnconditionalJump, Rs2)
            | (Register, Imm) => false,
        }
    }

    /// The operands this format encodes, in `rd, rs1, rs2, imm` order.
    #[must_use]
    pub fn operands(self) -> impl Iterator<Item = Operand> {
        Operand::ALL.into_iter().filter(move |&op| self.has(op))
    }

    /// Significant width of the reconstructed immediate, `None` for R-type.
    #[must_use]
    pub const fn immediate_width(self) -> Option<u32> {
        match self {
            InstructionFormat::Register => None,
            InstructionFormat::Load | InstructionFormat::Store => Some(12),
            InstructionFormat::ConditionalJump => Some(13),
            InstructionFormat::LongImmediate => Some(32),
            InstructionFormat::UnconditionalJump => Some(21),
        }
    }

    /// Conventional single-letter name of the format.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            InstructionFormat::Register => 'R',
            InstructionFormat::Load => 'I',
            InstructionFormat::Store => 'S',
            InstructionFormat::ConditionalJump => 'B',
            InstructionFormat::LongImmediate => 'U',
            InstructionFormat::UnconditionalJump => 'J',
        }
    }
}

impl fmt::Display for InstructionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}({})", self.letter())
    }
}

impl Serialize for InstructionFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
