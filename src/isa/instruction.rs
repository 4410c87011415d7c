//! Decoded RISC-V instruction representation.

use serde::{Serialize, Serializer};
use std::fmt;

use super::format::{InstructionClass, InstructionFormat, Operand};
use super::immediate;

/// Value reported for an operand the instruction's format does not encode.
pub const NOT_APPLICABLE: i64 = -1;

/// Instruction name as resolved by the opcode registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    /// Name found at opcode, funct3 or funct7 level.
    Known(&'static str),
    /// The opcode is known but its funct3/funct7 combination is not.
    Unresolved,
}

impl Mnemonic {
    /// The resolved name, if any.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self {
            Mnemonic::Known(name) => Some(name),
            Mnemonic::Unresolved => None,
        }
    }

    /// Whether the registry produced a name.
    #[must_use]
    pub const fn is_resolved(self) -> bool {
        matches!(self, Mnemonic::Known(_))
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or("unknown"))
    }
}

impl Serialize for Mnemonic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Mnemonic::Known(name) => serializer.serialize_str(name),
            Mnemonic::Unresolved => serializer.serialize_none(),
        }
    }
}

/// A decoded RISC-V instruction.
///
/// # Field Conventions
/// - `rd`, `rs1`, `rs2`: register indices (0-31), `None` when the format has no
///   such field
/// - `imm`: raw reconstructed immediate, not sign-extended; see
///   [`DecodedInstruction::signed_imm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DecodedInstruction {
    /// The encoded instruction word.
    pub word: u32,
    /// Major opcode, bits [6:0].
    pub opcode: u8,
    /// Instruction set the opcode belongs to.
    pub class: InstructionClass,
    /// Encoding layout.
    pub format: InstructionFormat,
    /// Instruction name.
    pub mnemonic: Mnemonic,
    /// Destination register.
    pub rd: Option<u8>,
    /// First source register.
    pub rs1: Option<u8>,
    /// Second source register.
    pub rs2: Option<u8>,
    /// Immediate as an unsigned bit pattern.
    pub imm: Option<u32>,
}

impl DecodedInstruction {
    /// Value of `operand`, or `None` if the format does not encode it.
    #[must_use]
    pub fn operand(&self, operand: Operand) -> Option<u32> {
        match operand {
            Operand::Rd => self.rd.map(u32::from),
            Operand::Rs1 => self.rs1.map(u32::from),
            Operand::Rs2 => self.rs2.map(u32::from),
            Operand::Imm => self.imm,
        }
    }

    /// Value of `operand`, or [`NOT_APPLICABLE`] if the format does not encode it.
    #[must_use]
    pub fn operand_or_sentinel(&self, operand: Operand) -> i64 {
        self.operand(operand).map_or(NOT_APPLICABLE, i64::from)
    }

    /// Immediate sign-extended from its format's width.
    #[must_use]
    pub fn signed_imm(&self) -> Option<i32> {
        self.imm.and_then(|raw| immediate::sign_extend(self.format, raw))
    }
}

impl fmt::Display for DecodedInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic)?;

        let mut separator = " ";
        for operand in self.format.operands() {
            let Some(value) = self.operand(operand) else {
                continue;
            };
            f.write_str(separator)?;
            match operand {
                Operand::Imm => write!(f, "{value:#x}")?,
                Operand::Rd | Operand::Rs1 | Operand::Rs2 => write!(f, "x{value}")?,
            }
            separator = ", ";
        }
        Ok(())
    }
}
