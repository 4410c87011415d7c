//! Opcode registry.
//!
//! Instruction metadata is a static table keyed by opcode. Opcodes whose
//! mnemonic depends on funct3 (and, beneath that, funct7) carry nested
//! override tables; overrides only ever name the instruction, class and
//! format are fixed per opcode.
//!
//! Adding instructions is a table edit: the decoder never matches on
//! mnemonics.

use std::fmt;
use std::sync::OnceLock;

use super::fields::{FUNCT3, FUNCT7, OPCODE};
use super::format::{InstructionClass, InstructionFormat};
use super::instruction::Mnemonic;

/// Number of distinct 7-bit opcodes.
const OPCODE_SLOTS: usize = 1 << 7;

/// Mnemonic override selected by funct7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Funct7Entry {
    /// funct7 value, bits [31:25].
    pub funct7: u8,
    /// Instruction name.
    pub mnemonic: &'static str,
}

/// Mnemonic override selected by funct3, optionally refined by funct7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Funct3Entry {
    /// funct3 value, bits [14:12].
    pub funct3: u8,
    /// Name used when funct7 does not refine it further.
    pub mnemonic: Option<&'static str>,
    /// funct7 refinements.
    pub funct7: &'static [Funct7Entry],
}

/// Metadata for one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    /// Major opcode, bits [6:0].
    pub opcode: u8,
    /// Instruction set.
    pub class: InstructionClass,
    /// Encoding layout shared by every instruction under this opcode.
    pub format: InstructionFormat,
    /// Name used when funct3 does not refine it.
    pub mnemonic: Option<&'static str>,
    /// funct3 refinements.
    pub funct3: &'static [Funct3Entry],
}

impl OpcodeEntry {
    /// An RV32I opcode whose name needs no refinement.
    #[must_use]
    pub const fn single(opcode: u8, format: InstructionFormat, mnemonic: &'static str) -> Self {
        Self {
            opcode,
            class: InstructionClass::Rv32i,
            format,
            mnemonic: Some(mnemonic),
            funct3: &[],
        }
    }

    /// An RV32I opcode named by funct3.
    #[must_use]
    pub const fn by_funct3(
        opcode: u8,
        format: InstructionFormat,
        funct3: &'static [Funct3Entry],
    ) -> Self {
        Self {
            opcode,
            class: InstructionClass::Rv32i,
            format,
            mnemonic: None,
            funct3,
        }
    }
}

impl Funct3Entry {
    /// A funct3 value that fully determines the name.
    #[must_use]
    pub const fn named(funct3: u8, mnemonic: &'static str) -> Self {
        Self {
            funct3,
            mnemonic: Some(mnemonic),
            funct7: &[],
        }
    }

    /// A funct3 value further split by funct7.
    #[must_use]
    pub const fn by_funct7(funct3: u8, funct7: &'static [Funct7Entry]) -> Self {
        Self {
            funct3,
            mnemonic: None,
            funct7,
        }
    }
}

impl Funct7Entry {
    /// A funct7 refinement.
    #[must_use]
    pub const fn named(funct7: u8, mnemonic: &'static str) -> Self {
        Self { funct7, mnemonic }
    }
}

/// RISC-V opcode constants.
pub mod opcode {
    /// `lui`
    pub const LUI: u8 = 0b011_0111;
    /// `auipc`
    pub const AUIPC: u8 = 0b001_0111;
    /// `jal`
    pub const JAL: u8 = 0b110_1111;
    /// `jalr`
    pub const JALR: u8 = 0b110_0111;
    /// Conditional branches.
    pub const BRANCH: u8 = 0b110_0011;
    /// Loads.
    pub const LOAD: u8 = 0b000_0011;
}

const BRANCH_FUNCT3: &[Funct3Entry] = &[
    Funct3Entry::named(0b000, "beq"),
    Funct3Entry::named(0b001, "bne"),
    Funct3Entry::named(0b100, "blt"),
    Funct3Entry::named(0b101, "bge"),
    Funct3Entry::named(0b110, "bltu"),
    Funct3Entry::named(0b111, "bgeu"),
];

const LOAD_FUNCT3: &[Funct3Entry] = &[
    Funct3Entry::named(0b000, "lb"),
    Funct3Entry::named(0b001, "lh"),
    Funct3Entry::named(0b010, "lw"),
    Funct3Entry::named(0b100, "lbu"),
    Funct3Entry::named(0b101, "lhu"),
];

/// Built-in RV32I table.
pub const RV32I: &[OpcodeEntry] = &[
    OpcodeEntry::single(opcode::LUI, InstructionFormat::LongImmediate, "lui"),
    OpcodeEntry::single(opcode::AUIPC, InstructionFormat::LongImmediate, "auipc"),
    OpcodeEntry::single(opcode::JAL, InstructionFormat::UnconditionalJump, "jal"),
    // RV32I encodes jalr as I-type.
    OpcodeEntry::single(opcode::JALR, InstructionFormat::Load, "jalr"),
    OpcodeEntry::by_funct3(opcode::BRANCH, InstructionFormat::ConditionalJump, BRANCH_FUNCT3),
    OpcodeEntry::by_funct3(opcode::LOAD, InstructionFormat::Load, LOAD_FUNCT3),
];

static RV32I_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Metadata resolved for a particular instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Major opcode.
    pub opcode: u8,
    /// Instruction set.
    pub class: InstructionClass,
    /// Encoding layout.
    pub format: InstructionFormat,
    /// Instruction name.
    pub mnemonic: Mnemonic,
}

/// Problems found while validating an opcode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// An opcode does not fit in 7 bits.
    OpcodeOutOfRange(u8),
    /// Two entries share an opcode.
    DuplicateOpcode(u8),
    /// A funct3 value does not fit in 3 bits.
    Funct3OutOfRange {
        /// Owning opcode.
        opcode: u8,
        /// Offending value.
        funct3: u8,
    },
    /// Two funct3 overrides of one opcode share a value.
    DuplicateFunct3 {
        /// Owning opcode.
        opcode: u8,
        /// Repeated value.
        funct3: u8,
    },
    /// A funct7 value does not fit in 7 bits.
    Funct7OutOfRange {
        /// Owning opcode.
        opcode: u8,
        /// Owning funct3.
        funct3: u8,
        /// Offending value.
        funct7: u8,
    },
    /// Two funct7 overrides under one funct3 share a value.
    DuplicateFunct7 {
        /// Owning opcode.
        opcode: u8,
        /// Owning funct3.
        funct3: u8,
        /// Repeated value.
        funct7: u8,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::OpcodeOutOfRange(opcode) => {
                write!(f, "opcode {opcode:#x} does not fit in 7 bits")
            }
            RegistryError::DuplicateOpcode(opcode) => {
                write!(f, "opcode {opcode:#09b} registered twice")
            }
            RegistryError::Funct3OutOfRange { opcode, funct3 } => {
                write!(f, "funct3 {funct3:#x} of opcode {opcode:#09b} does not fit in 3 bits")
            }
            RegistryError::DuplicateFunct3 { opcode, funct3 } => {
                write!(f, "funct3 {funct3:#05b} of opcode {opcode:#09b} registered twice")
            }
            RegistryError::Funct7OutOfRange {
                opcode,
                funct3,
                funct7,
            } => write!(
                f,
                "funct7 {funct7:#x} under opcode {opcode:#09b} funct3 {funct3:#05b} does not fit in 7 bits"
            ),
            RegistryError::DuplicateFunct7 {
                opcode,
                funct3,
                funct7,
            } => write!(
                f,
                "funct7 {funct7:#09b} under opcode {opcode:#09b} funct3 {funct3:#05b} registered twice"
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Immutable opcode index over a static table.
#[derive(Debug, Clone)]
pub struct Registry {
    slots: Box<[Option<&'static OpcodeEntry>]>,
}

impl Registry {
    /// The built-in RV32I registry, indexed on first use.
    #[must_use]
    pub fn rv32i() -> &'static Registry {
        RV32I_REGISTRY.get_or_init(|| Self::index(RV32I))
    }

    /// Build a registry over `table`.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if a key does not fit its field or is
    /// registered twice at the same level.
    pub fn from_table(table: &'static [OpcodeEntry]) -> Result<Self, RegistryError> {
        validate(table)?;
        Ok(Self::index(table))
    }

    /// Index a table already known to be valid.
    fn index(table: &'static [OpcodeEntry]) -> Self {
        let mut slots = vec![None; OPCODE_SLOTS].into_boxed_slice();
        for entry in table {
            if let Some(slot) = slots.get_mut(usize::from(entry.opcode)) {
                *slot = Some(entry);
            }
        }
        Self { slots }
    }

    /// Entry registered for `opcode`.
    #[must_use]
    pub fn lookup(&self, opcode: u8) -> Option<&'static OpcodeEntry> {
        self.slots.get(usize::from(opcode)).copied().flatten()
    }

    /// Registered entries in opcode order.
    pub fn entries(&self) -> impl Iterator<Item = &'static OpcodeEntry> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    /// Resolve the metadata of `word`.
    ///
    /// Returns `None` only when the opcode is not registered. The mnemonic is
    /// taken from the most specific level that names it: funct7, funct3, then
    /// the opcode itself, falling back to [`Mnemonic::Unresolved`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // fields are at most 7 bits wide
    pub fn resolve(&self, word: u32) -> Option<Resolution> {
        let opcode = OPCODE.extract(word) as u8;
        let entry = self.lookup(opcode)?;

        let mut mnemonic = entry.mnemonic;
        if !entry.funct3.is_empty() {
            let funct3 = FUNCT3.extract(word) as u8;
            if let Some(sub) = entry.funct3.iter().find(|sub| sub.funct3 == funct3) {
                mnemonic = sub.mnemonic.or(mnemonic);
                if !sub.funct7.is_empty() {
                    let funct7 = FUNCT7.extract(word) as u8;
                    if let Some(leaf) = sub.funct7.iter().find(|leaf| leaf.funct7 == funct7) {
                        mnemonic = Some(leaf.mnemonic);
                    }
                }
            }
        }

        let mnemonic = mnemonic.map_or(Mnemonic::Unresolved, Mnemonic::Known);
        tracing::trace!(word, opcode, %mnemonic, format = %entry.format, "resolved opcode");

        Some(Resolution {
            opcode,
            class: entry.class,
            format: entry.format,
            mnemonic,
        })
    }
}

/// Check every key of `table` against its field width and for duplicates.
fn validate(table: &[OpcodeEntry]) -> Result<(), RegistryError> {
    for (i, entry) in table.iter().enumerate() {
        let opcode = entry.opcode;
        if opcode >= 1 << 7 {
            return Err(RegistryError::OpcodeOutOfRange(opcode));
        }
        if table[..i].iter().any(|other| other.opcode == opcode) {
            return Err(RegistryError::DuplicateOpcode(opcode));
        }

        for (j, sub) in entry.funct3.iter().enumerate() {
            let funct3 = sub.funct3;
            if funct3 >= 1 << 3 {
                return Err(RegistryError::Funct3OutOfRange { opcode, funct3 });
            }
            if entry.funct3[..j].iter().any(|other| other.funct3 == funct3) {
                return Err(RegistryError::DuplicateFunct3 { opcode, funct3 });
            }

            for (k, leaf) in sub.funct7.iter().enumerate() {
                let funct7 = leaf.funct7;
                if funct7 >= 1 << 7 {
                    return Err(RegistryError::Funct7OutOfRange {
                        opcode,
                        funct3,
                        funct7,
                    });
                }
                if sub.funct7[..k].iter().any(|other| other.funct7 == funct7) {
                    return Err(RegistryError::DuplicateFunct7 {
                        opcode,
                        funct3,
                        funct7,
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OP: u8 = 0b011_0011;
    const MISC_MEM: u8 = 0b000_1111;

    const ADD_SUB: &[Funct7Entry] = &[
        Funct7Entry::named(0b000_0000, "add"),
        Funct7Entry::named(0b010_0000, "sub"),
    ];
    const SRA: &[Funct7Entry] = &[Funct7Entry::named(0b010_0000, "sra")];

    /// R-type arithmetic, for exercising funct7 refinement.
    const OP_FUNCT3: &[Funct3Entry] = &[
        Funct3Entry::by_funct7(0b000, ADD_SUB),
        Funct3Entry {
            funct3: 0b101,
            mnemonic: Some("srl"),
            funct7: SRA,
        },
        Funct3Entry::named(0b111, "and"),
    ];

    const WITH_OP: &[OpcodeEntry] = &[
        OpcodeEntry::by_funct3(OP, InstructionFormat::Register, OP_FUNCT3),
        OpcodeEntry::single(opcode::LUI, InstructionFormat::LongImmediate, "lui"),
    ];

    const FENCE: &[Funct3Entry] = &[Funct3Entry::named(0b000, "fence")];
    const WITH_OPCODE_NAME: &[OpcodeEntry] = &[OpcodeEntry {
        opcode: MISC_MEM,
        class: InstructionClass::Rv32i,
        format: InstructionFormat::Load,
        mnemonic: Some("misc-mem"),
        funct3: FENCE,
    }];

    const DUP_OPCODE: &[OpcodeEntry] = &[
        OpcodeEntry::single(opcode::LUI, InstructionFormat::LongImmediate, "lui"),
        OpcodeEntry::single(opcode::LUI, InstructionFormat::LongImmediate, "lui2"),
    ];

    const BEQ_TWICE: &[Funct3Entry] = &[
        Funct3Entry::named(0b000, "beq"),
        Funct3Entry::named(0b000, "beq2"),
    ];
    const DUP_FUNCT3: &[OpcodeEntry] = &[OpcodeEntry::by_funct3(
        opcode::BRANCH,
        InstructionFormat::ConditionalJump,
        BEQ_TWICE,
    )];

    const ADD_TWICE: &[Funct7Entry] = &[
        Funct7Entry::named(0b000_0000, "add"),
        Funct7Entry::named(0b000_0000, "add2"),
    ];
    const ADD_TWICE_FUNCT3: &[Funct3Entry] = &[Funct3Entry::by_funct7(0b000, ADD_TWICE)];
    const DUP_FUNCT7: &[OpcodeEntry] = &[OpcodeEntry::by_funct3(
        OP,
        InstructionFormat::Register,
        ADD_TWICE_FUNCT3,
    )];

    const BIG_OPCODE: &[OpcodeEntry] =
        &[OpcodeEntry::single(0x80, InstructionFormat::LongImmediate, "bad")];

    const BAD_FUNCT3: &[Funct3Entry] = &[Funct3Entry::named(8, "bad")];
    const BIG_FUNCT3: &[OpcodeEntry] = &[OpcodeEntry::by_funct3(
        opcode::LOAD,
        InstructionFormat::Load,
        BAD_FUNCT3,
    )];

    fn word(opcode: u8, funct3: u32, funct7: u32) -> u32 {
        u32::from(opcode) | (funct3 << 12) | (funct7 << 25)
    }

    fn mnemonic(registry: &Registry, word: u32) -> Mnemonic {
        registry.resolve(word).unwrap().mnemonic
    }

    #[test]
    fn test_builtin_table_is_valid() {
        assert_eq!(validate(RV32I), Ok(()));
        assert_eq!(Registry::rv32i().entries().count(), RV32I.len());
    }

    #[test]
    fn test_lookup() {
        let registry = Registry::rv32i();
        let lui = registry.lookup(opcode::LUI).unwrap();
        assert_eq!(lui.format, InstructionFormat::LongImmediate);
        assert_eq!(lui.mnemonic, Some("lui"));
        assert!(registry.lookup(OP).is_none());
        assert!(registry.lookup(0xff).is_none());
    }

    #[test]
    fn test_entries_in_opcode_order() {
        let opcodes: Vec<u8> = Registry::rv32i().entries().map(|e| e.opcode).collect();
        let mut sorted = opcodes.clone();
        sorted.sort_unstable();
        assert_eq!(opcodes, sorted);
    }

    #[test]
    fn test_opcode_only_ignores_funct_bits() {
        let registry = Registry::rv32i();
        for funct3 in 0..8 {
            let res = registry.resolve(word(opcode::JALR, funct3, 0x7f)).unwrap();
            assert_eq!(res.mnemonic, Mnemonic::Known("jalr"));
            assert_eq!(res.format, InstructionFormat::Load);
        }
    }

    #[test]
    fn test_branch_funct3() {
        let registry = Registry::rv32i();
        let expected = [
            (0b000, Mnemonic::Known("beq")),
            (0b001, Mnemonic::Known("bne")),
            (0b010, Mnemonic::Unresolved),
            (0b011, Mnemonic::Unresolved),
            (0b100, Mnemonic::Known("blt")),
            (0b101, Mnemonic::Known("bge")),
            (0b110, Mnemonic::Known("bltu")),
            (0b111, Mnemonic::Known("bgeu")),
        ];
        for (funct3, want) in expected {
            assert_eq!(mnemonic(registry, word(opcode::BRANCH, funct3, 0)), want);
        }
    }

    #[test]
    fn test_load_funct3() {
        let registry = Registry::rv32i();
        assert_eq!(
            mnemonic(registry, word(opcode::LOAD, 0b010, 0)),
            Mnemonic::Known("lw")
        );
        assert_eq!(
            mnemonic(registry, word(opcode::LOAD, 0b011, 0)),
            Mnemonic::Unresolved
        );
    }

    #[test]
    fn test_unknown_opcode() {
        assert!(Registry::rv32i().resolve(0b111_1111).is_none());
    }

    #[test]
    fn test_funct7_refinement() {
        let registry = Registry::from_table(WITH_OP).unwrap();
        assert_eq!(mnemonic(&registry, word(OP, 0b000, 0)), Mnemonic::Known("add"));
        assert_eq!(mnemonic(&registry, word(OP, 0b000, 0x20)), Mnemonic::Known("sub"));
        // No funct7 match and no funct3-level name.
        assert_eq!(mnemonic(&registry, word(OP, 0b000, 0x01)), Mnemonic::Unresolved);
        // No funct7 match falls back to the funct3-level name.
        assert_eq!(mnemonic(&registry, word(OP, 0b101, 0)), Mnemonic::Known("srl"));
        assert_eq!(mnemonic(&registry, word(OP, 0b101, 0x20)), Mnemonic::Known("sra"));
        // funct3 without funct7 overrides ignores funct7 entirely.
        assert_eq!(mnemonic(&registry, word(OP, 0b111, 0x7f)), Mnemonic::Known("and"));
        assert_eq!(mnemonic(&registry, word(OP, 0b010, 0)), Mnemonic::Unresolved);
        assert_eq!(
            registry.resolve(word(OP, 0b010, 0)).unwrap().format,
            InstructionFormat::Register
        );
    }

    #[test]
    fn test_funct3_miss_falls_back_to_opcode_name() {
        let registry = Registry::from_table(WITH_OPCODE_NAME).unwrap();
        assert_eq!(
            mnemonic(&registry, word(MISC_MEM, 0b000, 0)),
            Mnemonic::Known("fence")
        );
        assert_eq!(
            mnemonic(&registry, word(MISC_MEM, 0b001, 0)),
            Mnemonic::Known("misc-mem")
        );
    }

    #[test]
    fn test_validation_rejects_duplicates() {
        assert_eq!(
            Registry::from_table(DUP_OPCODE).unwrap_err(),
            RegistryError::DuplicateOpcode(opcode::LUI)
        );
        assert_eq!(
            Registry::from_table(DUP_FUNCT3).unwrap_err(),
            RegistryError::DuplicateFunct3 {
                opcode: opcode::BRANCH,
                funct3: 0
            }
        );
        assert_eq!(
            Registry::from_table(DUP_FUNCT7).unwrap_err(),
            RegistryError::DuplicateFunct7 {
                opcode: OP,
                funct3: 0,
                funct7: 0
            }
        );
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        assert_eq!(
            Registry::from_table(BIG_OPCODE).unwrap_err(),
            RegistryError::OpcodeOutOfRange(0x80)
        );
        assert_eq!(
            Registry::from_table(BIG_FUNCT3).unwrap_err(),
            RegistryError::Funct3OutOfRange {
                opcode: opcode::LOAD,
                funct3: 8
            }
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            RegistryError::DuplicateOpcode(opcode::LUI).to_string(),
            "opcode 0b0110111 registered twice"
        );
    }
}
