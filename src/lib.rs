// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Cachalot: a table-driven RV32I instruction decoder.
//!
//! Decoding turns a raw 32-bit word into its opcode, class, format, mnemonic,
//! register operands and immediate:
//!
//! ```text
//! word ──► opcode ──► Registry ──► format ──► operands + immediate
//!                     (funct3 / funct7 refine the mnemonic)
//! ```
//!
//! # Example
//!
//! ```
//! use cachalot::isa::{self, InstructionFormat, Mnemonic};
//!
//! // beq x1, x2, 8
//! let inst = isa::decode(0x0020_8463).unwrap();
//! assert_eq!(inst.mnemonic, Mnemonic::Known("beq"));
//! assert_eq!(inst.format, InstructionFormat::ConditionalJump);
//! assert_eq!(inst.rd, None);
//! assert_eq!(inst.imm, Some(8));
//! ```

pub mod error;
pub mod image;
pub mod isa;

pub use error::{DecodeError, DecodeResult};
pub use isa::{DecodedInstruction, decode};
