//! Instruction decoding.
//!
//! Decoding is a fixed pipeline: the opcode selects registry metadata, the
//! format decides which operands exist, and each existing operand is pulled
//! out of the word. Only an unknown opcode fails; an unknown funct3/funct7
//! combination still yields a complete instruction with
//! [`Mnemonic::Unresolved`](super::Mnemonic::Unresolved).

use crate::error::{DecodeError, DecodeResult};

use super::fields::{BitField, OPCODE, RD, RS1, RS2};
use super::format::{InstructionFormat, Operand};
use super::immediate;
use super::instruction::DecodedInstruction;
use super::registry::Registry;

/// Decodes instruction words against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r Registry,
}

impl<'r> Decoder<'r> {
    /// Create a decoder backed by `registry`.
    #[must_use]
    pub const fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// The registry this decoder resolves opcodes against.
    #[must_use]
    pub const fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Decode a 32-bit instruction word.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnsupportedOpcode`] if the opcode is not in the
    /// registry.
    #[allow(clippy::cast_possible_truncation)] // opcode is 7 bits wide
    pub fn decode(&self, word: u32) -> DecodeResult<DecodedInstruction> {
        let Some(resolved) = self.registry.resolve(word) else {
            let opcode = OPCODE.extract(word) as u8;
            tracing::debug!(word, opcode, "unsupported opcode");
            return Err(DecodeError::UnsupportedOpcode { word, opcode });
        };

        let format = resolved.format;
        let inst = DecodedInstruction {
            word,
            opcode: resolved.opcode,
            class: resolved.class,
            format,
            mnemonic: resolved.mnemonic,
            rd: register(format, Operand::Rd, RD, word),
            rs1: register(format, Operand::Rs1, RS1, word),
            rs2: register(format, Operand::Rs2, RS2, word),
            imm: immediate::reconstruct(format, word),
        };

        tracing::trace!(word, %inst, "decoded");
        Ok(inst)
    }
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new(Registry::rv32i())
    }
}

/// Extract a register operand if `format` encodes it.
#[allow(clippy::cast_possible_truncation)] // register fields are 5 bits wide
fn register(format: InstructionFormat, operand: Operand, field: BitField, word: u32) -> Option<u8> {
    format.has(operand).then(|| field.extract(word) as u8)
}
