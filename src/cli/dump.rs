//! Dump command implementation.

use super::output::{JsonDecoded, format_listing};
use super::{CliError, OutputFormat, Presentation};
use cachalot::image::ProgramImage;
use std::path::Path;
use std::time::Instant;

/// Execute the dump command.
///
/// Words with unsupported opcodes are listed inline; data embedded in code
/// sections is normal, so they do not fail the command.
///
/// # Errors
///
/// Returns an error if the image cannot be loaded.
pub(crate) fn execute(
    file: &Path,
    base: u32,
    threads: Option<usize>,
    presentation: Presentation,
) -> Result<(), CliError> {
    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let image = ProgramImage::read(file, base)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", file.display())))?;

    let start = Instant::now();
    let listings = image.disassemble();
    tracing::info!(
        file = %file.display(),
        sections = image.sections.len(),
        words = listings.len(),
        elapsed_us = start.elapsed().as_micros(),
        "disassembled image"
    );

    match presentation.format {
        OutputFormat::Text => {
            for section in &image.sections {
                println!(
                    "section {} @ {:#010x} ({} words)",
                    section.name,
                    section.address,
                    section.words.len()
                );
            }
            println!();
            for listing in &listings {
                println!("{}", format_listing(listing, presentation.signed));
            }
        }
        OutputFormat::Json => {
            let json: Vec<_> = listings.iter().map(JsonDecoded::from_listing).collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
