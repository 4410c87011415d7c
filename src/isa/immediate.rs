//! Immediate reconstruction.
//!
//! Each immediate-bearing format scatters its immediate across the word in a
//! different order. The gatherers below put the pieces back together and
//! return the raw bit pattern; they never sign-extend. Use [`sign_extend`]
//! for the two's-complement view.
//!
//! Sign extension reinterprets the unsigned pattern as `i32`.

#![allow(clippy::cast_possible_wrap)]

use super::fields::{
    B_IMM_4_1, B_IMM_10_5, B_IMM_11, B_IMM_12, I_IMM_11_0, J_IMM_10_1, J_IMM_11, J_IMM_19_12,
    J_IMM_20, S_IMM_4_0, S_IMM_11_5, U_IMM_31_12,
};
use super::format::InstructionFormat;

/// Reconstruct the immediate of `word` as laid out by `format`.
///
/// Returns `None` for formats without an immediate.
#[must_use]
pub const fn reconstruct(format: InstructionFormat, word: u32) -> Option<u32> {
    match format {
        InstructionFormat::Register => None,
        InstructionFormat::Load => Some(i_type(word)),
        InstructionFormat::Store => Some(s_type(word)),
        InstructionFormat::ConditionalJump => Some(b_type(word)),
        InstructionFormat::LongImmediate => Some(u_type(word)),
        InstructionFormat::UnconditionalJump => Some(j_type(word)),
    }
}

/// I-type immediate (12 bits).
/// imm[11:0] = inst[31:20]
#[must_use]
pub const fn i_type(word: u32) -> u32 {
    I_IMM_11_0.extract(word)
}

/// S-type immediate (12 bits).
/// imm[11:5] = inst[31:25], imm[4:0] = inst[11:7]
#[must_use]
pub const fn s_type(word: u32) -> u32 {
    (S_IMM_11_5.extract(word) << 5) | S_IMM_4_0.extract(word)
}

/// B-type immediate (13 bits, bit 0 always 0).
/// imm[12|10:5|4:1|11] = inst[31|30:25|11:8|7]
#[must_use]
pub const fn b_type(word: u32) -> u32 {
    (B_IMM_12.extract(word) << 12)
        | (B_IMM_11.extract(word) << 11)
        | (B_IMM_10_5.extract(word) << 5)
        | (B_IMM_4_1.extract(word) << 1)
}

/// U-type immediate (upper 20 bits, low 12 bits always 0).
/// imm[31:12] = inst[31:12]
#[must_use]
pub const fn u_type(word: u32) -> u32 {
    U_IMM_31_12.extract(word) << 12
}

/// J-type immediate (21 bits, bit 0 always 0).
/// imm[20|10:1|11|19:12] = inst[31|30:21|20|19:12]
#[must_use]
pub const fn j_type(word: u32) -> u32 {
    (J_IMM_20.extract(word) << 20)
        | (J_IMM_19_12.extract(word) << 12)
        | (J_IMM_11.extract(word) << 11)
        | (J_IMM_10_1.extract(word) << 1)
}

/// Sign-extend a reconstructed immediate from its format's width.
///
/// Bits above the width are discarded. Returns `None` for formats without an
/// immediate.
#[must_use]
pub const fn sign_extend(format: InstructionFormat, raw: u32) -> Option<i32> {
    let Some(width) = format.immediate_width() else {
        return None;
    };
    let shift = 32 - width;
    Some(((raw << shift) as i32) >> shift)
}
