//! Block-level validation: raw token checks plus feature rules.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::validate::{validate_feature, ValidationResult};
use crate::model::{BlockKind, Feature, Face, ProfileContext, RawBlock, SegmentKind};
use crate::parser::fields::{face_token, is_malformed_work_plane, parse_work_plane};
use crate::parser::{marking, DecoderRegistry, Fields};

/// Outcome of validating one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockReport {
    pub kind: BlockKind,
    /// Best-effort decoded feature; `None` when decoding failed.
    pub feature: Option<Feature>,
    pub result: ValidationResult,
}

impl BlockReport {
    pub fn is_valid(&self) -> bool {
        self.result.is_valid
    }
}

/// Faces a block kind may carry.
///
/// Every face-coded kind takes all four faces. A punch face letter also
/// picks its work plane when no `E#` token is given.
pub fn legal_faces(kind: BlockKind) -> &'static [Face] {
    match kind {
        BlockKind::OuterContour
        | BlockKind::InnerContour
        | BlockKind::Cut
        | BlockKind::ArcContour
        | BlockKind::Hole
        | BlockKind::Punch
        | BlockKind::Marking => &Face::ALL,
        BlockKind::Header | BlockKind::FreeformContour | BlockKind::End => &[],
    }
}

/// Single-letter tokens a kind uses as keywords rather than faces.
fn is_keyword_letter(kind: BlockKind, token: &str) -> bool {
    match kind {
        BlockKind::Hole => matches!(token, "l" | "r"),
        BlockKind::FreeformContour => SegmentKind::from_code(token).is_some(),
        _ => false,
    }
}

/// Tokens that carry codes rather than free text.
///
/// Marking text starts where the marking decoder puts it, so text such as
/// `E12` or `a` is never read as a plane or a face.
fn code_tokens<'a>(block: &'a RawBlock) -> Vec<&'a str> {
    let tokens: Vec<&str> = block
        .fields
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    match block.kind {
        BlockKind::Header | BlockKind::End => Vec::new(),
        BlockKind::Marking => {
            let fields = Fields::new(BlockKind::Marking, &block.fields);
            let end = marking::text_start(&fields).unwrap_or(tokens.len());
            tokens[..end.min(tokens.len())].to_vec()
        }
        _ => tokens,
    }
}

/// Check face letters and work-plane tokens of a raw block.
pub fn check_block_tokens(block: &RawBlock) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let legal = legal_faces(block.kind);

    for token in code_tokens(block) {
        if is_malformed_work_plane(token) {
            result.add_error(format!(
                "{} block: malformed work plane '{}', expected E0..E9",
                block.kind, token
            ));
            continue;
        }
        if parse_work_plane(token).is_some() || is_keyword_letter(block.kind, token) {
            continue;
        }

        let mut chars = token.chars();
        let lone_letter = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_lowercase() => Some(c),
            _ => None,
        };
        let Some(letter) = lone_letter else {
            continue;
        };
        match face_token(token) {
            Some(face) if legal.contains(&face) => {}
            Some(face) => result.add_error(format!(
                "{} block: face '{}' ({}) not allowed here",
                block.kind, letter, face
            )),
            None => result.add_error(format!(
                "{} block: illegal face code '{}'",
                block.kind, letter
            )),
        }
    }

    result
}

/// Decode and validate one block.
///
/// Decode failures become errors; the feature is still returned whenever
/// decoding succeeded, even if rules fail.
pub fn validate_block(
    block: &RawBlock,
    registry: &DecoderRegistry,
    profile: Option<&ProfileContext>,
) -> BlockReport {
    let mut result = check_block_tokens(block);

    let feature = match registry.decode(block, profile) {
        Ok(feature) => {
            result.merge(validate_feature(&feature));
            Some(feature)
        }
        Err(e) => {
            result.add_error(e.to_string());
            None
        }
    };

    debug!(
        kind = %block.kind,
        valid = result.is_valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "block validated"
    );

    BlockReport {
        kind: block.kind,
        feature,
        result,
    }
}
