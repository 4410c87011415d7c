//! Output formatting utilities for CLI.

use cachalot::DecodeResult;
use cachalot::image::Listing;
use cachalot::isa::{DecodedInstruction, InstructionClass, InstructionFormat, OpcodeEntry, Operand};
use serde::Serialize;
use std::fmt::Write as _;

/// JSON-serializable decode outcome.
#[derive(Debug, Serialize)]
pub(super) struct JsonDecoded {
    /// Address of the word (dump only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) address: Option<u32>,
    /// The raw instruction word.
    pub(super) word: u32,
    /// Decoded instruction (null on failure).
    pub(super) instruction: Option<DecodedInstruction>,
    /// Sign-extended immediate, if the instruction has one.
    pub(super) signed_imm: Option<i32>,
    /// Assembly rendering.
    pub(super) asm: Option<String>,
    /// Error message (null on success).
    pub(super) error: Option<String>,
}

impl JsonDecoded {
    /// Create from a decode result.
    pub(super) fn new(
        address: Option<u32>,
        word: u32,
        result: &DecodeResult<DecodedInstruction>,
    ) -> Self {
        match result {
            Ok(inst) => Self {
                address,
                word,
                instruction: Some(*inst),
                signed_imm: inst.signed_imm(),
                asm: Some(inst.to_string()),
                error: None,
            },
            Err(e) => Self {
                address,
                word,
                instruction: None,
                signed_imm: None,
                asm: None,
                error: Some(e.to_string()),
            },
        }
    }

    /// Create from a disassembly listing.
    pub(super) fn from_listing(listing: &Listing) -> Self {
        Self::new(Some(listing.address), listing.word, &listing.result)
    }
}

/// JSON-serializable registry entry.
#[derive(Debug, Serialize)]
pub(super) struct JsonOpcode {
    /// Major opcode.
    pub(super) opcode: u8,
    /// Instruction set.
    pub(super) class: InstructionClass,
    /// Encoding layout.
    pub(super) format: InstructionFormat,
    /// Every mnemonic reachable under this opcode.
    pub(super) mnemonics: Vec<&'static str>,
}

impl JsonOpcode {
    /// Create from a registry entry.
    pub(super) fn from_entry(entry: &OpcodeEntry) -> Self {
        Self {
            opcode: entry.opcode,
            class: entry.class,
            format: entry.format,
            mnemonics: mnemonics(entry),
        }
    }
}

/// Every mnemonic an opcode entry can resolve to, outermost first.
pub(super) fn mnemonics(entry: &OpcodeEntry) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = entry.mnemonic.into_iter().collect();
    for sub in entry.funct3 {
        names.extend(sub.mnemonic);
        names.extend(sub.funct7.iter().map(|leaf| leaf.mnemonic));
    }
    names
}

/// Format a decoded instruction field by field.
///
/// Absent operands print as -1.
pub(super) fn format_instruction(inst: &DecodedInstruction, signed: bool) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "instruction: {:#010x}", inst.word);
    let _ = writeln!(output, "  opcode:   {:#09b}", inst.opcode);
    let _ = writeln!(output, "  class:    {}", inst.class);
    let _ = writeln!(output, "  format:   {}", inst.format);
    let _ = writeln!(output, "  mnemonic: {}", inst.mnemonic);
    for operand in [Operand::Rd, Operand::Rs1, Operand::Rs2] {
        let label = format!("{operand}:");
        let _ = writeln!(output, "  {label:<9} {}", inst.operand_or_sentinel(operand));
    }

    let _ = write!(output, "  imm:      {}", inst.operand_or_sentinel(Operand::Imm));
    if let Some(raw) = inst.imm {
        let _ = write!(output, " ({raw:#x})");
    }
    if let (true, Some(value)) = (signed, inst.signed_imm()) {
        let _ = write!(output, " signed {value}");
    }
    output.push('\n');

    let _ = writeln!(output, "  asm:      {inst}");
    output
}

/// Format one disassembly line.
pub(super) fn format_listing(listing: &Listing, signed: bool) -> String {
    let mut line = format!("{:08x}:  {:08x}  ", listing.address, listing.word);
    match &listing.result {
        Ok(inst) => {
            let _ = write!(line, "{inst}");
            if let (true, Some(value)) = (signed, inst.signed_imm()) {
                let _ = write!(line, "  # {value}");
            }
        }
        Err(_) => line.push_str("<unsupported>"),
    }
    line
}

/// Format the registry as a table.
pub(super) fn format_opcodes<'a>(entries: impl Iterator<Item = &'a OpcodeEntry>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{:<9}  {:<5}  {:<22}  mnemonics", "opcode", "class", "format");
    for entry in entries {
        let _ = writeln!(
            output,
            "{:#09b}  {:<5}  {:<22}  {}",
            entry.opcode,
            entry.class.to_string(),
            entry.format.to_string(),
            mnemonics(entry).join(", ")
        );
    }
    output
}
