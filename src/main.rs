//! Cachalot CLI - Command-line interface for decoding RV32I instructions.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// Cachalot - A table-driven RV32I instruction decoder
#[derive(Parser, Debug)]
#[command(name = "cachalot")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Output format: text or json
    #[arg(short, long, global = true, default_value = "text")]
    format: cli::OutputFormat,

    /// Also show immediates sign-extended to their format width
    #[arg(short, long, global = true)]
    signed: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode one or more instruction words (hex, 0x or 0b prefixed)
    Decode {
        /// Instruction words
        #[arg(required = true, num_args = 1.., value_parser = cli::parse_word)]
        words: Vec<u32>,
    },

    /// Disassemble an RV32 ELF or flat binary
    Dump {
        /// ELF or raw little-endian binary
        #[arg(required = true)]
        file: std::path::PathBuf,

        /// Load address of a flat binary (ignored for ELF)
        #[arg(short, long, default_value = "0", value_parser = cli::parse_word)]
        base: u32,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// List the opcodes known to the decoder
    Opcodes,
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` takes precedence over the `-v` count.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let presentation = cli::Presentation {
        format: args.format,
        signed: args.signed,
    };

    let result = match args.command {
        Commands::Decode { words } => cli::decode::execute(&words, presentation),

        Commands::Dump {
            file,
            base,
            threads,
        } => cli::dump::execute(&file, base, threads, presentation),

        Commands::Opcodes => cli::opcodes::execute(presentation.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
