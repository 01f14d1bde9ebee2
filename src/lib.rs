//! dstv-nc-rs - Decoding and validation of DSTV-style NC blocks.
//!
//! This library turns tokenized NC blocks (ST, AK, IK, SC, KA, UE, BO, PU,
//! SI, EN) into typed, validated features and orders them for a downstream
//! solid-geometry consumer: contours first, then cuts, holes and markings.
//!
//! # Example
//!
//! ```no_run
//! use dstv_nc_rs::{load_blocks, process_blocks, DecoderRegistry, PriorityManager};
//! use std::path::Path;
//!
//! let blocks = load_blocks(Path::new("beam.json")).unwrap();
//! let registry = DecoderRegistry::standard();
//! let manager = PriorityManager::new();
//! let processed = process_blocks(&blocks, &registry, &manager);
//! println!("{}", manager.report(&processed.features));
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod parser;
pub mod priority;
pub mod validation;

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

// Re-exports for convenience
pub use config::{ContourLayoutRules, DecoderOptions};
pub use error::{DecodeError, Error, Result};
pub use model::{
    BlockKind, EndMarker, Face, Feature, ProfileContext, ProfileHeader, RawBlock, WorkPlane,
};
pub use parser::DecoderRegistry;
pub use priority::{PriorityClass, PriorityManager};
pub use validation::{
    validate_block, validate_feature, validate_features, BlockReport, ValidationResult,
};

/// Result of running a whole block list through the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedFile {
    /// First successfully decoded header.
    pub header: Option<ProfileHeader>,
    /// Last successfully decoded end record.
    pub end: Option<EndMarker>,
    /// Priority-ordered features, header and end record excluded.
    pub features: Vec<Feature>,
    /// One report per input block, in input order.
    pub reports: Vec<BlockReport>,
    /// Blocks that failed to decode.
    pub skipped: usize,
    /// All block findings plus cross-feature checks.
    pub validation: ValidationResult,
}

impl ProcessedFile {
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid
    }
}

/// Read a JSON array of raw blocks.
pub fn load_blocks(path: &Path) -> Result<Vec<RawBlock>> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(Error::EmptyInput {
            path: path.to_path_buf(),
        });
    }
    let blocks: Vec<RawBlock> = serde_json::from_str(&content)?;
    debug!(path = %path.display(), blocks = blocks.len(), "loaded block file");
    Ok(blocks)
}

/// Decode, validate and order a block list.
///
/// The header is decoded first so every other block sees the profile
/// context. Blocks that fail to decode are skipped with a warning; blocks
/// that decode but break a rule keep their feature and add errors.
pub fn process_blocks(
    blocks: &[RawBlock],
    registry: &DecoderRegistry,
    manager: &PriorityManager,
) -> ProcessedFile {
    let header_index = blocks.iter().position(|b| b.kind == BlockKind::Header);
    let header_report = header_index.map(|i| validate_block(&blocks[i], registry, None));
    let header = header_report
        .as_ref()
        .and_then(|r| r.feature.as_ref())
        .and_then(Feature::as_header)
        .cloned();
    let profile = header.as_ref().map(ProfileHeader::context);

    if header.is_none() {
        warn!("No usable header block, decoding without profile context");
    }

    let mut reports = Vec::with_capacity(blocks.len());
    let mut decoded = Vec::with_capacity(blocks.len());
    let mut validation = ValidationResult::ok();
    let mut skipped = 0;

    for (i, block) in blocks.iter().enumerate() {
        let report = match (&header_report, header_index) {
            (Some(report), Some(index)) if index == i => report.clone(),
            _ => validate_block(block, registry, profile.as_ref()),
        };

        for error in &report.result.errors {
            validation.add_error(format!("Block {} ({}): {}", i, block.kind, error));
        }
        for warning in &report.result.warnings {
            validation.add_warning(format!("Block {} ({}): {}", i, block.kind, warning));
        }

        match &report.feature {
            Some(feature) => decoded.push(feature.clone()),
            None => {
                warn!("Skipping block {} ({}): failed to decode", i, block.kind);
                skipped += 1;
            }
        }
        reports.push(report);
    }

    validation.merge(validate_features(&decoded));

    let end = decoded.iter().rev().find_map(|f| match f {
        Feature::End(end) => Some(end.clone()),
        _ => None,
    });

    let body: Vec<Feature> = decoded
        .into_iter()
        .filter(|f| !matches!(f, Feature::Header(_) | Feature::End(_)))
        .collect();
    let features = manager.optimize_order(&body);

    info!(
        blocks = blocks.len(),
        features = features.len(),
        skipped,
        errors = validation.errors.len(),
        warnings = validation.warnings.len(),
        "Processed block list"
    );

    ProcessedFile {
        header,
        end,
        features,
        reports,
        skipped,
        validation,
    }
}
