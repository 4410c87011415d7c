//! Error types for instruction decoding.

use std::fmt;

/// Reasons a word cannot be decoded.
///
/// Only the opcode is load-bearing: an unknown funct3/funct7 combination is
/// reported through [`Mnemonic::Unresolved`](crate::isa::Mnemonic::Unresolved)
/// and never surfaces here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The 7-bit opcode has no registry entry.
    UnsupportedOpcode {
        /// The instruction word being decoded.
        word: u32,
        /// The opcode extracted from it.
        opcode: u8,
    },
}

impl DecodeError {
    /// The instruction word that failed to decode.
    #[must_use]
    pub const fn word(&self) -> u32 {
        match self {
            DecodeError::UnsupportedOpcode { word, .. } => *word,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnsupportedOpcode { word, opcode } => {
                write!(f, "unsupported opcode {opcode:#09b} in instruction {word:#010x}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = DecodeError::UnsupportedOpcode {
            word: 0x0000_0033,
            opcode: 0b011_0011,
        };
        assert_eq!(
            err.to_string(),
            "unsupported opcode 0b0110011 in instruction 0x00000033"
        );
        assert_eq!(err.word(), 0x33);
    }
}
