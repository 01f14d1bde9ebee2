//! dstv-check - CLI tool to decode, validate and order NC blocks.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dstv_nc_rs::validation::feature_extent;
use dstv_nc_rs::{load_blocks, process_blocks, DecoderOptions, DecoderRegistry, PriorityManager};

/// Decode and validate DSTV-style NC blocks for steel fabrication machines.
#[derive(Parser, Debug)]
#[command(name = "dstv-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input JSON file with tokenized blocks
    #[arg(short, long)]
    input: PathBuf,

    /// Derive per-face cut regions for outer contours
    #[arg(long)]
    derive_cut_regions: bool,

    /// Output the ordered features as JSON
    #[arg(long)]
    json: bool,

    /// Print the priority report
    #[arg(long)]
    report: bool,

    /// Fail when any block has validation errors
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Processing: {}", args.input.display());

    let blocks = load_blocks(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    info!("Loaded {} block(s)", blocks.len());

    let options = if args.derive_cut_regions {
        DecoderOptions::with_cut_regions()
    } else {
        DecoderOptions::default()
    };
    let registry = DecoderRegistry::with_options(options);
    let manager = PriorityManager::new();

    let processed = process_blocks(&blocks, &registry, &manager);

    if let Some(header) = &processed.header {
        info!(
            "Piece {} ({} {}): {} x {} x {}",
            header.piece_number,
            header.profile_kind.code(),
            header.profile_name,
            header.length,
            header.height,
            header.width
        );
    }

    for warning in &processed.validation.warnings {
        warn!("{}", warning);
    }

    for err in &processed.validation.errors {
        error!("{}", err);
    }

    info!(
        "{} feature(s), {} block(s) skipped",
        processed.features.len(),
        processed.skipped
    );

    if let Some(extent) = feature_extent(&processed.features) {
        info!("Feature extent: {:.1} x {:.1}", extent.width(), extent.height());
    }

    if args.report {
        println!("{}", manager.report(&processed.features));
    }

    if args.json {
        let json = serde_json::to_string_pretty(&processed.features)
            .context("Failed to serialize features")?;
        println!("{}", json);
    }

    if args.strict && !processed.is_valid() {
        anyhow::bail!("Validation failed");
    }

    Ok(())
}
