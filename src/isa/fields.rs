//! Bit-field extraction from 32-bit instruction words.
//!
//! Every field the decoder reads, whether an operand register or a slice of a
//! scattered immediate, is a statically known `(mask, offset)` pair applied
//! through [`extract`].

/// Extract the bits selected by `mask` and shift them down by `offset`.
#[inline]
#[must_use]
pub const fn extract(word: u32, mask: u32, offset: u32) -> u32 {
    (word & mask) >> offset
}

/// A contiguous bit field inside an instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField {
    mask: u32,
    offset: u32,
}

impl BitField {
    /// Create a field of `width` bits starting at bit `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the field is empty or does not fit in 32 bits. All fields in
    /// this module are constants, so the check fires at compile time.
    #[must_use]
    pub const fn new(offset: u32, width: u32) -> Self {
        assert!(width > 0 && width <= 32 && offset <= 32 - width);
        Self {
            mask: (u32::MAX >> (32 - width)) << offset,
            offset,
        }
    }

    /// The in-place mask of this field.
    #[must_use]
    pub const fn mask(self) -> u32 {
        self.mask
    }

    /// Bit position of the field's least significant bit.
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.offset
    }

    /// Number of bits in the field.
    #[must_use]
    pub const fn width(self) -> u32 {
        self.mask.count_ones()
    }

    /// Read this field out of `word`, right-aligned.
    #[inline]
    #[must_use]
    pub const fn extract(self, word: u32) -> u32 {
        extract(word, self.mask, self.offset)
    }
}

// ==================== Common fields ====================

/// Major opcode, bits [6:0].
pub const OPCODE: BitField = BitField::new(0, 7);
/// Destination register, bits [11:7].
pub const RD: BitField = BitField::new(7, 5);
/// Minor opcode, bits [14:12].
pub const FUNCT3: BitField = BitField::new(12, 3);
/// First source register, bits [19:15].
pub const RS1: BitField = BitField::new(15, 5);
/// Second source register, bits [24:20].
pub const RS2: BitField = BitField::new(20, 5);
/// Secondary minor opcode, bits [31:25].
pub const FUNCT7: BitField = BitField::new(25, 7);

// ==================== Immediate slices ====================

/// I-type imm[11:0] = inst[31:20]
pub const I_IMM_11_0: BitField = BitField::new(20, 12);

/// S-type imm[11:5] = inst[31:25]
pub const S_IMM_11_5: BitField = BitField::new(25, 7);
/// S-type imm[4:0] = inst[11:7]
pub const S_IMM_4_0: BitField = BitField::new(7, 5);

/// B-type imm[12] = inst[31]
pub const B_IMM_12: BitField = BitField::new(31, 1);
/// B-type imm[11] = inst[7]
pub const B_IMM_11: BitField = BitField::new(7, 1);
/// B-type imm[10:5] = inst[30:25]
pub const B_IMM_10_5: BitField = BitField::new(25, 6);
/// B-type imm[4:1] = inst[11:8]
pub const B_IMM_4_1: BitField = BitField::new(8, 4);

/// U-type imm[31:12] = inst[31:12]
pub const U_IMM_31_12: BitField = BitField::new(12, 20);

/// J-type imm[20] = inst[31]
pub const J_IMM_20: BitField = BitField::new(31, 1);
/// J-type imm[19:12] = inst[19:12]
pub const J_IMM_19_12: BitField = BitField::new(12, 8);
/// J-type imm[11] = inst[20]
pub const J_IMM_11: BitField = BitField::new(20, 1);
/// J-type imm[10:1] = inst[30:21]
pub const J_IMM_10_1: BitField = BitField::new(21, 10);

/// Every named field, for table-driven checks.
pub const ALL: &[(&str, BitField)] = &[
    ("opcode", OPCODE),
    ("rd", RD),
    ("funct3", FUNCT3),
    ("rs1", RS1),
    ("rs2", RS2),
    ("funct7", FUNCT7),
    ("i_imm[11:0]", I_IMM_11_0),
    ("s_imm[11:5]", S_IMM_11_5),
    ("s_imm[4:0]", S_IMM_4_0),
    ("b_imm[12]", B_IMM_12),
    ("b_imm[11]", B_IMM_11),
    ("b_imm[10:5]", B_IMM_10_5),
    ("b_imm[4:1]", B_IMM_4_1),
    ("u_imm[31:12]", U_IMM_31_12),
    ("j_imm[20]", J_IMM_20),
    ("j_imm[19:12]", J_IMM_19_12),
    ("j_imm[11]", J_IMM_11),
    ("j_imm[10:1]", J_IMM_10_1),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode() {
        assert_eq!(OPCODE.extract(0x0), 0x0);
        assert_eq!(OPCODE.extract(0x1), 0x1);
        assert_eq!(OPCODE.extract(0b111_1111), 0b111_1111);
        assert_eq!(OPCODE.extract(0b1111_1111), 0b111_1111);
    }

    #[test]
    fn test_funct3() {
        assert_eq!(FUNCT3.extract(0x0), 0x0);
        assert_eq!(FUNCT3.extract(0x1fff), 0x1);
        assert_eq!(FUNCT3.extract(0x7fff), 0x7);
        assert_eq!(FUNCT3.extract(0xffff), 0x7);
    }

    #[test]
    fn test_funct7() {
        assert_eq!(FUNCT7.extract(0x0), 0x0);
        assert_eq!(FUNCT7.extract(0x0200_0000), 0x1);
        assert_eq!(FUNCT7.extract(0xfe00_0000), 0x7f);
        assert_eq!(FUNCT7.extract(0xffff_ffff), 0x7f);
    }

    #[test]
    fn test_registers() {
        assert_eq!(RD.extract(0x80), 0x1);
        assert_eq!(RD.extract(0xffff), 0x1f);
        assert_eq!(RS1.extract(0xffff), 0x1);
        assert_eq!(RS1.extract(0xfffff), 0x1f);
        assert_eq!(RS2.extract(0x1f_ffff), 0x1);
        assert_eq!(RS2.extract(0x1ff_ffff), 0x1f);
    }

    #[test]
    fn test_all_ones_saturates_every_field() {
        for (name, field) in ALL {
            let expected = u32::MAX >> (32 - field.width());
            assert_eq!(field.extract(u32::MAX), expected, "field {name}");
        }
    }

    #[test]
    fn test_mask_matches_hand_computed() {
        assert_eq!(OPCODE.mask(), 0x7f);
        assert_eq!(FUNCT3.mask(), 0x7 << 12);
        assert_eq!(FUNCT7.mask(), 0x7f << 25);
        assert_eq!(U_IMM_31_12.mask(), 0xffff_f000);
        assert_eq!(B_IMM_12.mask(), 0x8000_0000);
        assert_eq!(U_IMM_31_12.offset(), 12);
    }

    #[test]
    fn test_full_word_field() {
        let whole = BitField::new(0, 32);
        assert_eq!(whole.mask(), u32::MAX);
        assert_eq!(whole.extract(0xdead_beef), 0xdead_beef);
    }
}
