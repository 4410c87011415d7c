//! RISC-V instruction set definitions.

mod decoder;
pub mod fields;
mod format;
pub mod immediate;
mod instruction;
mod registry;

use rayon::prelude::*;

use crate::error::DecodeResult;

pub use decoder::Decoder;
pub use format::{InstructionClass, InstructionFormat, Operand};
pub use instruction::{DecodedInstruction, Mnemonic, NOT_APPLICABLE};
pub use registry::{
    Funct3Entry, Funct7Entry, OpcodeEntry, RV32I, Registry, RegistryError, Resolution, opcode,
};

/// Decode a 32-bit instruction word against the built-in RV32I registry.
///
/// # Errors
///
/// Returns [`DecodeError::UnsupportedOpcode`](crate::DecodeError::UnsupportedOpcode)
/// if the opcode is not registered.
pub fn decode(word: u32) -> DecodeResult<DecodedInstruction> {
    Decoder::default().decode(word)
}

/// Decode a batch of words in parallel, preserving order.
#[must_use]
pub fn decode_all(words: &[u32]) -> Vec<DecodeResult<DecodedInstruction>> {
    let decoder = Decoder::default();
    words.par_iter().map(|&word| decoder.decode(word)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_all_preserves_order() {
        let words: Vec<u32> = (0..4096u32).map(|i| i.wrapping_mul(0x9E37_79B9)).collect();
        let parallel = decode_all(&words);
        let sequential: Vec<_> = words.iter().map(|&w| decode(w)).collect();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_decode_all_empty() {
        assert!(decode_all(&[]).is_empty());
    }
}
