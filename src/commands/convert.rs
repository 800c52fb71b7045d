//! Convert command implementation.
//!
//! The convert command:
//! 1. Parses the JiveXML input and extracts the track arrays
//! 2. Reconstructs hits and builds the ig store
//! 3. Writes the ig file
//!
//! Nothing is written unless every earlier step succeeded.

use crate::builder::{build_store, collection_names, BuildOptions, BuildSummary};
use crate::geometry::TraversalKind;
use crate::output::{validate_path, write_store};
use crate::parser::{read_document, ExtractOptions};
use crate::reconstruction::ReconstructionMode;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the convert command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    /// JiveXML input file
    pub input: PathBuf,

    /// ig output file
    pub output: PathBuf,

    /// What each track point becomes
    pub mode: ReconstructionMode,

    /// Order in which track points are visited
    pub traversal: TraversalKind,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::from("event.ig.json"),
            mode: ReconstructionMode::TimeOfFlight,
            traversal: TraversalKind::Polyline,
            print_summary: false,
        }
    }
}

/// Execute the convert command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// Record counts of the written store
///
/// # Errors
/// * Unreadable or malformed input
/// * Store type violations
/// * File write errors
pub fn execute_convert(args: ConvertArgs) -> Result<BuildSummary> {
    let start_time = Instant::now();

    info!(
        "Converting {} -> {} ({:?}, {:?} traversal)",
        args.input.display(),
        args.output.display(),
        args.mode,
        args.traversal
    );

    // Step 1: Extract tracks
    info!("Step 1/3: Extracting tracks...");
    let extract_options = ExtractOptions {
        length_scale: args.mode.length_scale(),
    };
    let event = read_document(&args.input, &extract_options)
        .with_context(|| format!("Failed to extract tracks from {}", args.input.display()))?;

    debug!(
        "Run {} event {}: {} tracks, {} polyline points",
        event.header.run,
        event.header.event,
        event.tracks.track_count(),
        event.tracks.point_count()
    );

    // Step 2: Build store
    info!("Step 2/3: Reconstructing hits and building store...");
    let build_options = BuildOptions {
        mode: args.mode,
        traversal: args.traversal,
    };
    let store = build_store(&event, &build_options).context("Failed to build ig store")?;

    let summary = BuildSummary::from_store(&store, args.mode);
    info!("Built {}", summary.summary());

    // Step 3: Serialize once, after construction is complete
    info!("Step 3/3: Writing ig file...");
    write_store(&store, &args.output).context("Failed to write ig file")?;
    drop(store);

    info!("✓ ig file written to: {}", args.output.display());

    if args.print_summary {
        let (tracks, hits, links) = collection_names(args.mode);
        println!("\n{}", "=".repeat(60));
        println!("CONVERSION SUMMARY");
        println!("{}", "=".repeat(60));
        println!("Run:          {}", event.header.run);
        println!("Event:        {}", event.header.event);
        println!("{:<13} {}", format!("{}:", tracks), summary.tracks);
        println!("{:<13} {}", format!("{}:", hits), summary.hits);
        println!("{:<13} {}", format!("{}:", links), summary.associations);
        println!("{}", "=".repeat(60));
    }

    let elapsed = start_time.elapsed();
    info!("Conversion completed in {:.2}s", elapsed.as_secs_f64());

    Ok(summary)
}

/// Validate convert arguments
///
/// **Public** - can be called before execute_convert for early validation
pub fn validate_args(args: &ConvertArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    validate_path(&args.output).context("Invalid output path")?;

    if args.input == args.output {
        anyhow::bail!("Input and output must be different files");
    }

    Ok(())
}
