#![no_main]

use arbitrary::Arbitrary;
use cachalot::isa::{self, Operand, Registry};
use libfuzzer_sys::fuzz_target;

/// Structured input for decoder fuzzing.
#[derive(Arbitrary, Debug)]
struct DecodeInput {
    /// Bits above the opcode.
    high: u32,
    /// Opcode selector; registered opcodes are favored.
    opcode: u8,
    /// Use the opcode verbatim instead of a registered one.
    raw_opcode: bool,
}

fuzz_target!(|input: DecodeInput| {
    let registry = Registry::rv32i();
    let entries: Vec<_> = registry.entries().collect();

    let opcode = if input.raw_opcode || entries.is_empty() {
        u32::from(input.opcode & 0x7f)
    } else {
        u32::from(entries[usize::from(input.opcode) % entries.len()].opcode)
    };
    let word = (input.high & !0x7f) | opcode;

    match isa::decode(word) {
        Ok(inst) => {
            assert_eq!(inst.word, word);
            assert!(registry.lookup(inst.opcode).is_some());
            for operand in Operand::ALL {
                assert_eq!(inst.operand(operand).is_some(), inst.format.has(operand));
            }
            if let Some(index) = inst.rd {
                assert!(index < 32);
            }
            let _ = inst.to_string();
        }
        Err(e) => {
            assert_eq!(e.word(), word);
            assert!(registry.lookup((word & 0x7f) as u8).is_none());
        }
    }
});
