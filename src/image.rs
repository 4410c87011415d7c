//! Program image loading for disassembly.
//!
//! An image is either a RISC-V ELF, whose executable sections are decoded, or
//! a flat little-endian binary decoded as a single section.

use goblin::elf::Elf;
use goblin::elf::section_header::{SHF_EXECINSTR, SHT_PROGBITS};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::DecodeResult;
use crate::isa::{self, DecodedInstruction};

/// ELF file magic.
const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Instruction width in bytes.
const WORD_BYTES: usize = 4;

/// Name given to the single section of a flat binary.
pub const RAW_SECTION: &str = "raw";

/// Error type for image loading.
#[derive(Debug)]
pub enum ImageError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The ELF could not be parsed or is not RV32 little-endian.
    Elf(String),
    /// A section does not hold a whole number of 32-bit words.
    UnalignedSection {
        /// Section name.
        name: String,
        /// Section size in bytes.
        size: usize,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Io(e) => write!(f, "failed to read image: {e}"),
            ImageError::Elf(reason) => write!(f, "ELF load error: {reason}"),
            ImageError::UnalignedSection { name, size } => {
                write!(f, "section {name} is {size} bytes, not a multiple of {WORD_BYTES}")
            }
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageError::Io(e) => Some(e),
            ImageError::Elf(_) | ImageError::UnalignedSection { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImageError {
    fn from(e: std::io::Error) -> Self {
        ImageError::Io(e)
    }
}

/// A run of instruction words at a known address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSection {
    /// Section name.
    pub name: String,
    /// Address of the first word.
    pub address: u32,
    /// Instruction words in memory order.
    pub words: Vec<u32>,
}

/// One disassembled word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    /// Address of the word.
    pub address: u32,
    /// The raw word.
    pub word: u32,
    /// Decoding outcome.
    pub result: DecodeResult<DecodedInstruction>,
}

/// Executable code extracted from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramImage {
    /// Code sections in file order.
    pub sections: Vec<CodeSection>,
}

impl ProgramImage {
    /// Read and parse an image from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(path = %path.display(), base = format_args!("{base:#x}"))
    )]
    pub fn read(path: &Path, base: u32) -> Result<Self, ImageError> {
        let bytes = fs::read(path)?;
        Self::parse(&bytes, base)
    }

    /// Parse an image from bytes.
    ///
    /// ELF input is recognized by its magic number; anything else is a flat
    /// binary loaded at `base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ELF is invalid or not RV32 little-endian, or a
    /// section is not word-aligned in size.
    pub fn parse(bytes: &[u8], base: u32) -> Result<Self, ImageError> {
        if bytes.starts_with(ELF_MAGIC) {
            Self::parse_elf(bytes)
        } else {
            let words = to_words(RAW_SECTION, bytes)?;
            Ok(Self {
                sections: vec![CodeSection {
                    name: RAW_SECTION.to_string(),
                    address: base,
                    words,
                }],
            })
        }
    }

    fn parse_elf(bytes: &[u8]) -> Result<Self, ImageError> {
        let elf = Elf::parse(bytes)
            .map_err(|e| ImageError::Elf(format!("failed to parse ELF: {e}")))?;
        validate_elf_header(&elf)?;

        let mut sections = Vec::new();
        for shdr in &elf.section_headers {
            if shdr.sh_type != SHT_PROGBITS || shdr.sh_flags & u64::from(SHF_EXECINSTR) == 0 {
                continue;
            }

            let name = elf
                .shdr_strtab
                .get_at(shdr.sh_name)
                .unwrap_or("<unnamed>")
                .to_string();
            let address = u32::try_from(shdr.sh_addr).map_err(|_| {
                ImageError::Elf(format!(
                    "section {name} address {:#x} doesn't fit in u32",
                    shdr.sh_addr
                ))
            })?;
            let data = shdr
                .file_range()
                .and_then(|range| bytes.get(range))
                .ok_or_else(|| ImageError::Elf(format!("section {name} extends past end of file")))?;

            tracing::debug!(section = %name, address, size = data.len(), "loaded code section");
            let words = to_words(&name, data)?;
            sections.push(CodeSection {
                name,
                address,
                words,
            });
        }

        Ok(Self { sections })
    }

    /// Total number of instruction words.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.sections.iter().map(|s| s.words.len()).sum()
    }

    /// Decode every word of every section.
    #[must_use]
    pub fn disassemble(&self) -> Vec<Listing> {
        let mut listings = Vec::with_capacity(self.word_count());
        for section in &self.sections {
            let decoded = isa::decode_all(&section.words);
            let addresses = (0u32..).map(|i| section.address.wrapping_add(i.wrapping_mul(4)));
            listings.extend(
                addresses
                    .zip(&section.words)
                    .zip(decoded)
                    .map(|((address, &word), result)| Listing {
                        address,
                        word,
                        result,
                    }),
            );
        }
        listings
    }
}

/// Validate the ELF header for RISC-V 32-bit little-endian.
fn validate_elf_header(elf: &Elf) -> Result<(), ImageError> {
    if elf.header.e_machine != goblin::elf::header::EM_RISCV {
        return Err(ImageError::Elf(format!(
            "expected RISC-V ELF (machine {}), got machine type {}",
            goblin::elf::header::EM_RISCV,
            elf.header.e_machine
        )));
    }

    if elf.is_64 {
        return Err(ImageError::Elf("expected 32-bit ELF, got 64-bit".to_string()));
    }

    if !elf.little_endian {
        return Err(ImageError::Elf("expected little-endian ELF".to_string()));
    }

    Ok(())
}

/// Split `bytes` into little-endian words.
fn to_words(name: &str, bytes: &[u8]) -> Result<Vec<u32>, ImageError> {
    let chunks = bytes.chunks_exact(WORD_BYTES);
    if !chunks.remainder().is_empty() {
        return Err(ImageError::UnalignedSection {
            name: name.to_string(),
            size: bytes.len(),
        });
    }
    Ok(chunks
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Mnemonic;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Records the fields of every new span.
    #[derive(Debug, Clone, Default)]
    struct SpanFields(Arc<Mutex<Vec<(String, String)>>>);

    #[derive(Debug)]
    struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

    impl Visit for FieldVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl<S: tracing::Subscriber> Layer<S> for SpanFields {
        fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
            attrs.record(&mut FieldVisitor(&mut self.0.lock().unwrap()));
        }
    }

    #[test]
    fn test_raw_image() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x0020_8463u32.to_le_bytes());
        bytes.extend_from_slice(&0x0020_81B3u32.to_le_bytes());

        let image = ProgramImage::parse(&bytes, 0x1000).unwrap();
        assert_eq!(image.sections.len(), 1);
        assert_eq!(image.sections[0].name, RAW_SECTION);
        assert_eq!(image.sections[0].words, vec![0x0020_8463, 0x0020_81B3]);

        let listing = image.disassemble();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].address, 0x1000);
        assert_eq!(listing[0].result.unwrap().mnemonic, Mnemonic::Known("beq"));
        assert_eq!(listing[1].address, 0x1004);
        assert!(listing[1].result.is_err());
    }

    #[test]
    fn test_raw_image_unaligned() {
        let err = ProgramImage::parse(&[0x63, 0x84, 0x20], 0).unwrap_err();
        assert!(matches!(err, ImageError::UnalignedSection { size: 3, .. }));
    }

    #[test]
    fn test_empty_raw_image() {
        let image = ProgramImage::parse(&[], 0).unwrap();
        assert_eq!(image.word_count(), 0);
        assert!(image.disassemble().is_empty());
    }

    #[test]
    fn test_read_span_records_base() {
        let fields = SpanFields::default();
        let subscriber = tracing_subscriber::registry().with(fields.clone());

        let result = tracing::subscriber::with_default(subscriber, || {
            ProgramImage::read(Path::new("/nonexistent/image.bin"), 0x8000_0000)
        });
        assert!(matches!(result, Err(ImageError::Io(_))));

        let recorded = fields.0.lock().unwrap();
        assert!(recorded.iter().any(|(name, value)| name == "base" && value == "0x80000000"));
        assert!(recorded.iter().any(|(name, _)| name == "path"));
    }

    #[test]
    fn test_truncated_elf() {
        let err = ProgramImage::parse(b"\x7fELF\x01\x01", 0).unwrap_err();
        assert!(matches!(err, ImageError::Elf(_)));
    }
}
