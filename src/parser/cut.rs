//! Cut (SC) decoder.

use tracing::{debug, trace};

use super::fields::{
    classify_trailing, detect_encoding, face_token, parse_number, parse_work_plane,
    split_face_prefix, Encoding, Fields, TrailingValue,
};
use super::registry::DecodeContext;
use crate::config::{CUT_CIRCULAR_RATIO, CUT_RECTANGULAR_RATIO};
use crate::error::{DecodeError, DecodeResult};
use crate::model::{Cut, CutKind, Feature};

/// x, y, width, height.
const MIN_VALUES: usize = 4;

/// Cut kind from the width/height aspect ratio.
pub fn cut_kind_from_aspect(width: f64, height: f64) -> CutKind {
    let (long, short) = if width >= height { (width, height) } else { (height, width) };
    if short <= 0.0 {
        return CutKind::Rectangular;
    }
    let ratio = long / short;
    if ratio < CUT_CIRCULAR_RATIO {
        CutKind::Circular
    } else if ratio < CUT_RECTANGULAR_RATIO {
        CutKind::Rectangular
    } else {
        CutKind::Angular
    }
}

/// Explicit cut kind keyword.
fn keyword_kind(token: &str) -> Option<CutKind> {
    match token.to_ascii_lowercase().as_str() {
        "notch" => Some(CutKind::Notch),
        "bevel" => Some(CutKind::Bevel),
        "angle" => Some(CutKind::Angular),
        _ => None,
    }
}

/// Decode an SC block.
///
/// Standard: `x y width height [angle] [radius] [depth] [E#] [keyword]`.
/// Legacy: face-coded `x y width height`, then optional trailing values
/// classified by magnitude.
pub fn decode_cut(fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<Cut> {
    let encoding = detect_encoding(fields);
    let mut cut = Cut::default();
    let mut keyword = None;
    let mut values = Vec::new();

    for token in fields.iter() {
        if let Some(plane) = parse_work_plane(token) {
            cut.work_plane = plane;
        } else if let Some(face) = face_token(token) {
            cut.face.get_or_insert(face);
        } else if let Some(kind) = keyword_kind(token) {
            keyword = Some(kind);
        } else if let Some(value) = parse_number(token) {
            if let (Some(face), _) = split_face_prefix(token) {
                cut.face.get_or_insert(face);
            }
            values.push(value);
        } else if values.len() < MIN_VALUES {
            return Err(fields.invalid(["x", "y", "width", "height"][values.len()], token));
        } else {
            trace!(token, "dropping unknown cut token");
        }
    }

    if values.len() < MIN_VALUES {
        return Err(DecodeError::TooFewFields {
            kind: fields.kind(),
            minimum: MIN_VALUES,
            found: values.len(),
        });
    }

    cut.x = values[0];
    cut.y = values[1];
    cut.width = values[2];
    cut.height = values[3];

    match encoding {
        Encoding::Standard => {
            cut.angle = values.get(4).copied().unwrap_or(0.0);
            cut.radius = values.get(5).copied().filter(|r| *r > 0.0);
            cut.depth = values.get(6).copied();
            for value in values.iter().skip(7) {
                trace!(value, "dropping extra cut value");
            }
        }
        Encoding::Legacy => {
            let mut angle = None;
            for &value in &values[MIN_VALUES..] {
                match classify_trailing(value) {
                    Some(TrailingValue::Angle(a)) if angle.is_none() => angle = Some(a),
                    other => trace!(value, guess = ?other, "dropping trailing cut value"),
                }
            }
            cut.angle = angle.unwrap_or(0.0);
        }
    }

    cut.cut_kind = keyword.unwrap_or_else(|| cut_kind_from_aspect(cut.width, cut.height));
    debug!(?encoding, kind = ?cut.cut_kind, "cut decoded");
    Ok(cut)
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_cut(fields, ctx).map(Feature::Cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Face};
    use crate::parser::DecoderRegistry;

    fn cut(tokens: &[&str]) -> DecodeResult<Cut> {
        let registry = DecoderRegistry::standard();
        let raw: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        decode_cut(&Fields::new(BlockKind::Cut, &raw), &registry.context(None))
    }

    // ==================== Aspect ratio tests ====================

    #[test]
    fn test_cut_kind_from_aspect() {
        assert_eq!(cut_kind_from_aspect(50.0, 52.0), CutKind::Circular);
        assert_eq!(cut_kind_from_aspect(100.0, 50.0), CutKind::Rectangular);
        assert_eq!(cut_kind_from_aspect(300.0, 50.0), CutKind::Angular);
        assert_eq!(cut_kind_from_aspect(0.0, 50.0), CutKind::Rectangular);
    }

    // ==================== Standard encoding tests ====================

    #[test]
    fn test_standard_full() {
        let c = cut(&["100", "20", "80", "40", "15", "5", "3", "E2"]).expect("Should parse");
        assert_eq!((c.x, c.y, c.width, c.height), (100.0, 20.0, 80.0, 40.0));
        assert_eq!(c.angle, 15.0);
        assert_eq!(c.radius, Some(5.0));
        assert_eq!(c.depth, Some(3.0));
        assert_eq!(c.work_plane.index(), 2);
        assert_eq!(c.cut_kind, CutKind::Rectangular);
        assert_eq!(c.face, None);
    }

    #[test]
    fn test_standard_minimal_defaults() {
        let c = cut(&["0", "0", "40", "40"]).expect("Should parse");
        assert_eq!(c.angle, 0.0);
        assert_eq!(c.radius, None);
        assert_eq!(c.depth, None);
        assert_eq!(c.cut_kind, CutKind::Circular);
        assert_eq!(Feature::Cut(c).type_name(), "straight_cut");
    }

    #[test]
    fn test_keyword_overrides_aspect() {
        let c = cut(&["0", "0", "40", "40", "notch"]).expect("Should parse");
        assert_eq!(c.cut_kind, CutKind::Notch);
        let c = cut(&["0", "0", "40", "40", "0", "0", "0", "BEVEL"]).expect("Should parse");
        assert_eq!(c.cut_kind, CutKind::Bevel);
    }

    // ==================== Legacy encoding tests ====================

    #[test]
    fn test_legacy_prefixed() {
        let c = cut(&["o100.0u", "20.0", "300.0", "50.0", "30"]).expect("Should parse");
        assert_eq!(c.face, Some(Face::Top));
        assert_eq!(c.x, 100.0);
        assert_eq!(c.angle, 30.0);
        assert_eq!(c.cut_kind, CutKind::Angular);
    }

    #[test]
    fn test_legacy_trailing_heuristic() {
        let c = cut(&["v", "0", "0", "100", "50", "0.05", "1200", "-45"]).expect("Should parse");
        assert_eq!(c.face, Some(Face::Web));
        assert_eq!(c.angle, -45.0);
    }

    #[test]
    fn test_legacy_unmatched_trailing_never_fails() {
        let c = cut(&["v", "0", "0", "100", "50", "99999"]).expect("Should parse");
        assert_eq!(c.angle, 0.0);
    }

    // ==================== Error tests ====================

    #[test]
    fn test_too_few_values() {
        assert!(matches!(
            cut(&["0", "0", "40"]),
            Err(DecodeError::TooFewFields { minimum: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_non_numeric_mandatory() {
        assert!(matches!(
            cut(&["0", "0", "wide", "40"]),
            Err(DecodeError::InvalidNumber { ref field, .. }) if field == "width"
        ));
    }
}
