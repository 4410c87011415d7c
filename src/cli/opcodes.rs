//! Opcodes command implementation.

use super::output::{JsonOpcode, format_opcodes};
use super::{CliError, OutputFormat};
use cachalot::isa::Registry;

/// Execute the opcodes command.
///
/// # Errors
///
/// Returns an error if JSON encoding fails.
pub(crate) fn execute(format: OutputFormat) -> Result<(), CliError> {
    let registry = Registry::rv32i();

    match format {
        OutputFormat::Text => print!("{}", format_opcodes(registry.entries())),
        OutputFormat::Json => {
            let json: Vec<_> = registry.entries().map(JsonOpcode::from_entry).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
