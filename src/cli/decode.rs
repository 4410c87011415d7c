//! Decode command implementation.

use super::output::{JsonDecoded, format_instruction};
use super::{CliError, OutputFormat, Presentation};
use cachalot::isa;

/// Execute the decode command.
///
/// Every word is reported, including the ones that fail to decode.
///
/// # Errors
///
/// Returns an error if any word has an unsupported opcode.
pub(crate) fn execute(words: &[u32], presentation: Presentation) -> Result<(), CliError> {
    let results: Vec<_> = words.iter().map(|&word| (word, isa::decode(word))).collect();

    match presentation.format {
        OutputFormat::Text => {
            for (i, (_, result)) in results.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                match result {
                    Ok(inst) => print!("{}", format_instruction(inst, presentation.signed)),
                    Err(e) => println!("error: {e}"),
                }
            }
        }
        OutputFormat::Json => {
            let json: Vec<_> = results
                .iter()
                .map(|(word, result)| JsonDecoded::new(None, *word, result))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    let failures = results.iter().filter(|(_, result)| result.is_err()).count();
    summarize(failures, results.len())
}

/// Turn the failure count into the command outcome.
///
/// Each failure has already been reported next to its word, so the error only
/// carries the count.
fn summarize(failures: usize, total: usize) -> Result<(), CliError> {
    if failures == 0 {
        return Ok(());
    }
    Err(CliError::new(format!(
        "{failures} of {total} words have an unsupported opcode"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_success() {
        assert!(summarize(0, 3).is_ok());
    }

    #[test]
    fn test_summarize_counts_without_repeating_errors() {
        let message = summarize(2, 5).err().map(|e| e.to_string()).unwrap_or_default();
        assert_eq!(message, "2 of 5 words have an unsupported opcode");
        assert!(!message.contains("0x"));
    }
}
