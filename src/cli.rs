//! CLI command implementations for Cachalot.

pub(crate) mod decode;
pub(crate) mod dump;
pub(crate) mod opcodes;

mod output;

use cachalot::DecodeError;
use cachalot::image::ImageError;
use clap::ValueEnum;
use std::error::Error;
use std::fmt;

/// Output format shared by all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Presentation options shared by all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Presentation {
    /// Output format.
    pub(crate) format: OutputFormat,
    /// Show sign-extended immediates next to the raw bit pattern.
    pub(crate) signed: bool,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("Failed to encode JSON: {e}"))
    }
}

impl From<DecodeError> for CliError {
    fn from(e: DecodeError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<ImageError> for CliError {
    fn from(e: ImageError) -> Self {
        Self::new(e.to_string())
    }
}

/// Parse an instruction word or address from the command line.
///
/// Accepts `0x`-prefixed hex, `0b`-prefixed binary, or bare hex. Underscores
/// are ignored.
pub(crate) fn parse_word(text: &str) -> Result<u32, String> {
    let cleaned: String = text.trim().chars().filter(|&c| c != '_').collect();

    let (digits, radix) = if let Some(rest) = strip_prefix_ignore_case(&cleaned, "0x") {
        (rest, 16)
    } else if let Some(rest) = strip_prefix_ignore_case(&cleaned, "0b") {
        (rest, 2)
    } else {
        (cleaned.as_str(), 16)
    };

    if digits.is_empty() {
        return Err(format!("'{text}' has no digits"));
    }
    u32::from_str_radix(digits, radix)
        .map_err(|e| format!("'{text}' is not a 32-bit instruction word: {e}"))
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}
