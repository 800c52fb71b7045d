//! xml2ig CLI
//!
//! Converts a JiveXML event file into an ig file.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use std::path::PathBuf;

use xml2ig::commands::{execute_convert, validate_args, ConvertArgs};
use xml2ig::geometry::TraversalKind;
use xml2ig::reconstruction::ReconstructionMode;

/// xml2ig - JiveXML to ig converter
#[derive(Parser, Debug)]
#[command(name = "xml2ig")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input JiveXML file
    input: PathBuf,

    /// Output ig file
    output: PathBuf,

    /// What each track point becomes
    #[arg(long, value_enum, default_value_t = Mode::TimeOfFlight)]
    mode: Mode,

    /// Order in which track points are visited
    #[arg(long, value_enum, default_value_t = Traversal::Polyline)]
    traversal: Traversal,

    /// Print text summary to stdout
    #[arg(long)]
    summary: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Bare track points
    Positions,
    /// Hits with reconstructed arrival times
    TimeOfFlight,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Traversal {
    /// Raw polyline order
    Polyline,
    /// Line-set visitation order
    LineSet,
}

fn main() -> Result<()> {
    // Parse CLI arguments; wrong arity exits with usage here
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let args = ConvertArgs {
        input: cli.input,
        output: cli.output,
        mode: match cli.mode {
            Mode::Positions => ReconstructionMode::Positions,
            Mode::TimeOfFlight => ReconstructionMode::TimeOfFlight,
        },
        traversal: match cli.traversal {
            Traversal::Polyline => TraversalKind::Polyline,
            Traversal::LineSet => TraversalKind::LineSet,
        },
        print_summary: cli.summary,
    };

    // Validate args first
    validate_args(&args)?;

    execute_convert(args)?;

    Ok(())
}
