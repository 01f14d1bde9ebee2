//! Outer (AK) and inner (IK) contour decoders.

use tracing::{debug, trace};

use super::fields::{face_token, parse_number, parse_work_plane, split_face_prefix, Fields};
use super::layout::ContourLayout;
use super::registry::DecodeContext;
use crate::error::{DecodeError, DecodeResult};
use crate::geometry::{classify, derive_cut_regions, is_closed, spans_cross_dimension};
use crate::model::{Face, Feature, InnerContour, OuterContour, Point2D, WorkPlane};

/// Fewest points a contour block may carry before decoding fails.
const MIN_POINTS: usize = 3;

/// Values read from a contour block before kind-specific interpretation.
#[derive(Debug, Clone, Default, PartialEq)]
struct ContourFields {
    points: Vec<Point2D>,
    face: Option<Face>,
    work_plane: WorkPlane,
    /// Unpaired value at the end of a grouped block.
    leftover: Option<f64>,
}

fn read_contour(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<ContourFields> {
    let layout = ctx.layout.classify(fields);
    let parsed = match layout {
        ContourLayout::Matrix => read_matrix(fields)?,
        ContourLayout::Grouped => read_grouped(fields)?,
    };
    if parsed.points.len() < MIN_POINTS {
        return Err(DecodeError::TooFewFields {
            kind: fields.kind(),
            minimum: MIN_POINTS * 2,
            found: parsed.points.len() * 2 + usize::from(parsed.leftover.is_some()),
        });
    }
    Ok(parsed)
}

/// Rows of `[face] x y radius`. Without face codes rows are cut every three values.
fn read_matrix(fields: &Fields<'_>) -> DecodeResult<ContourFields> {
    let mut out = ContourFields::default();
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let face_rows = fields.iter().any(|t| face_token(t).is_some() || split_face_prefix(t).0.is_some());

    for token in fields.iter() {
        if let Some(plane) = parse_work_plane(token) {
            out.work_plane = plane;
            continue;
        }
        if let Some(face) = face_token(token) {
            out.face.get_or_insert(face);
            rows.push(Vec::new());
            continue;
        }
        let (prefix, _) = split_face_prefix(token);
        let value = parse_number(token).ok_or_else(|| fields.invalid("coordinate", token))?;
        match prefix {
            Some(face) => {
                out.face.get_or_insert(face);
                // A prefixed value opens a row unless a lone face token just did.
                if !matches!(rows.last(), Some(row) if row.is_empty()) {
                    rows.push(Vec::new());
                }
            }
            None if !face_rows && rows.last().map_or(true, |row| row.len() == 3) => {
                rows.push(Vec::new());
            }
            None if rows.is_empty() => rows.push(Vec::new()),
            None => {}
        }
        if let Some(row) = rows.last_mut() {
            row.push(value);
        }
    }

    for row in rows.iter().filter(|row| !row.is_empty()) {
        match row.as_slice() {
            [x, y] => out.points.push(Point2D::new(*x, *y)),
            [x, y, radius, rest @ ..] => {
                if *radius != 0.0 {
                    trace!(kind = %fields.kind(), radius, "corner radius not carried");
                }
                if !rest.is_empty() {
                    trace!(kind = %fields.kind(), extra = rest.len(), "dropping extra row values");
                }
                out.points.push(Point2D::new(*x, *y));
            }
            _ => {
                return Err(DecodeError::MissingField {
                    kind: fields.kind(),
                    field: "y".to_string(),
                })
            }
        }
    }
    Ok(out)
}

/// Optional face, then `(x, y)` pairs.
fn read_grouped(fields: &Fields<'_>) -> DecodeResult<ContourFields> {
    let mut out = ContourFields::default();
    let mut values = Vec::new();

    for token in fields.iter() {
        if let Some(plane) = parse_work_plane(token) {
            out.work_plane = plane;
            continue;
        }
        if let Some(face) = face_token(token) {
            out.face.get_or_insert(face);
            continue;
        }
        if let (Some(face), _) = split_face_prefix(token) {
            out.face.get_or_insert(face);
        }
        values.push(parse_number(token).ok_or_else(|| fields.invalid("coordinate", token))?);
    }

    let pairs = values.chunks_exact(2);
    out.leftover = pairs.remainder().first().copied();
    out.points = pairs.map(|p| Point2D::new(p[0], p[1])).collect();
    Ok(out)
}

/// Decode an AK block.
pub fn decode_outer_contour(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<OuterContour> {
    let parsed = read_contour(fields, ctx)?;
    if let Some(value) = parsed.leftover {
        trace!(value, "dropping unpaired outer contour value");
    }

    let cut_regions = match (ctx.options.derive_cut_regions, ctx.profile) {
        (true, Some(profile)) => derive_cut_regions(&parsed.points, parsed.face, profile),
        _ => Vec::new(),
    };

    debug!(
        points = parsed.points.len(),
        face = ?parsed.face,
        cut_regions = cut_regions.len(),
        "outer contour decoded"
    );

    Ok(OuterContour {
        points: parsed.points,
        face: parsed.face,
        closed: true,
        work_plane: parsed.work_plane,
        cut_regions,
    })
}

/// Decode an IK block. An unpaired trailing value is the depth.
///
/// An opening whose last point does not repeat the first has an implicit
/// closing edge, so `closed` follows the points rather than the block kind.
pub fn decode_inner_contour(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<InnerContour> {
    let parsed = read_contour(fields, ctx)?;
    let closed = is_closed(&parsed.points);
    let contour_kind = classify(&parsed.points);
    let is_transverse = ctx
        .profile
        .map_or(false, |profile| spans_cross_dimension(&parsed.points, parsed.face, profile));

    Ok(InnerContour {
        contour_kind,
        face: parsed.face,
        depth: parsed.leftover.unwrap_or(0.0),
        is_transverse,
        closed,
        points: parsed.points,
    })
}

pub fn decode_outer(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_outer_contour(fields, ctx).map(Feature::OuterContour)
}

pub fn decode_inner(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_inner_contour(fields, ctx).map(Feature::InnerContour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DecoderOptions;
    use crate::model::{BlockKind, ContourKind, CutRegion, ProfileContext};
    use crate::parser::DecoderRegistry;
    use pretty_assertions::assert_eq;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    fn outer(registry: &DecoderRegistry, tokens: &[&str], profile: Option<&ProfileContext>) -> OuterContour {
        let raw = strings(tokens);
        let fields = Fields::new(BlockKind::OuterContour, &raw);
        decode_outer_contour(&fields, &registry.context(profile)).expect("Should parse")
    }

    fn inner(tokens: &[&str], profile: Option<&ProfileContext>) -> DecodeResult<InnerContour> {
        let registry = DecoderRegistry::standard();
        let raw = strings(tokens);
        let fields = Fields::new(BlockKind::InnerContour, &raw);
        decode_inner_contour(&fields, &registry.context(profile))
    }

    fn rect(w: f64, h: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(w, 0.0),
            Point2D::new(w, h),
            Point2D::new(0.0, h),
            Point2D::new(0.0, 0.0),
        ]
    }

    // ==================== Outer contour tests ====================

    #[test]
    fn test_outer_grouped_standard() {
        let registry = DecoderRegistry::standard();
        let contour = outer(
            &registry,
            &["0", "0", "100", "0", "100", "50", "0", "50", "0", "0"],
            None,
        );
        assert_eq!(contour.points, rect(100.0, 50.0));
        assert_eq!(contour.face, None);
        assert!(contour.closed);
        assert_eq!(contour.work_plane, WorkPlane::default());
        assert!(contour.cut_regions.is_empty());
    }

    #[test]
    fn test_outer_grouped_legacy_face() {
        let registry = DecoderRegistry::standard();
        let contour = outer(
            &registry,
            &["o", "0.00u", "0.00", "100.00u", "0.00", "100.00", "50.00", "0.00", "50.00", "0", "0", "E1"],
            None,
        );
        assert_eq!(contour.face, Some(Face::Top));
        assert_eq!(contour.points, rect(100.0, 50.0));
        assert_eq!(contour.work_plane.index(), 1);
    }

    #[test]
    fn test_outer_matrix_with_faces() {
        let registry = DecoderRegistry::standard();
        let contour = outer(
            &registry,
            &[
                "v", "0.00u", "0.00", "0.00", "v", "100.00", "0.00", "0.00", "v", "100.00",
                "50.00", "0.00", "v", "0.00", "50.00", "0.00", "v", "0.00", "0.00", "0.00",
            ],
            None,
        );
        assert_eq!(contour.face, Some(Face::Web));
        assert_eq!(contour.points, rect(100.0, 50.0));
    }

    #[test]
    fn test_outer_matrix_prefixed_rows() {
        let registry = DecoderRegistry::standard();
        let contour = outer(
            &registry,
            &[
                "h0", "0", "0", "h100", "0", "0", "h100", "50", "0", "h0", "50", "0", "h0", "0",
                "0",
            ],
            None,
        );
        assert_eq!(contour.face, Some(Face::Rear));
        assert_eq!(contour.points, rect(100.0, 50.0));
    }

    #[test]
    fn test_outer_matrix_zero_radius_column() {
        let registry = DecoderRegistry::standard();
        let contour = outer(
            &registry,
            &["0", "0", "0", "100", "0", "0", "100", "50", "0", "0", "50", "0", "0", "0", "0"],
            None,
        );
        assert_eq!(contour.points, rect(100.0, 50.0));
    }

    #[test]
    fn test_outer_cut_regions_when_enabled() {
        let registry = DecoderRegistry::with_options(DecoderOptions::with_cut_regions());
        let profile = ProfileContext::new(1000.0, 100.0, 50.0);
        let contour = outer(
            &registry,
            &["v", "20", "0", "1000", "0", "1000", "100", "20", "100", "20", "0"],
            Some(&profile),
        );
        assert_eq!(
            contour.cut_regions,
            vec![CutRegion::from_corners(0.0, 0.0, 20.0, 100.0)]
        );
    }

    #[test]
    fn test_outer_cut_regions_disabled_by_default() {
        let registry = DecoderRegistry::standard();
        let profile = ProfileContext::new(1000.0, 100.0, 50.0);
        let contour = outer(
            &registry,
            &["v", "20", "0", "1000", "0", "1000", "100", "20", "100", "20", "0"],
            Some(&profile),
        );
        assert!(contour.cut_regions.is_empty());
    }

    #[test]
    fn test_outer_too_few_points() {
        let registry = DecoderRegistry::standard();
        let raw = strings(&["0", "0", "10", "0"]);
        let fields = Fields::new(BlockKind::OuterContour, &raw);
        let result = decode_outer_contour(&fields, &registry.context(None));
        assert!(matches!(result, Err(DecodeError::TooFewFields { .. })));
    }

    #[test]
    fn test_outer_rejects_garbage_coordinate() {
        let registry = DecoderRegistry::standard();
        let raw = strings(&["0", "0", "abc", "0", "100", "50"]);
        let fields = Fields::new(BlockKind::OuterContour, &raw);
        let result = decode_outer_contour(&fields, &registry.context(None));
        assert!(matches!(result, Err(DecodeError::InvalidNumber { .. })));
    }

    // ==================== Inner contour tests ====================

    #[test]
    fn test_inner_rectangular_through() {
        let contour = inner(&["v", "10", "10", "60", "10", "60", "40", "10", "40", "10", "10"], None)
            .expect("Should parse");
        assert_eq!(contour.contour_kind, ContourKind::Rectangular);
        assert_eq!(contour.depth, 0.0);
        assert_eq!(contour.face, Some(Face::Web));
        assert!(!contour.is_transverse);
        assert!(contour.closed);
    }

    #[test]
    fn test_inner_implicit_closing_edge() {
        let contour = inner(&["10", "10", "60", "10", "60", "40", "10", "40"], None)
            .expect("Should parse");
        assert_eq!(contour.points.len(), 4);
        assert!(!contour.closed);

        let result = crate::validation::validate_feature(&Feature::InnerContour(contour));
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_inner_trailing_depth() {
        let contour = inner(&["10", "10", "60", "10", "60", "40", "10", "40", "10", "10", "8"], None)
            .expect("Should parse");
        assert_eq!(contour.points.len(), 5);
        assert_eq!(contour.depth, 8.0);
    }

    #[test]
    fn test_inner_transverse() {
        let profile = ProfileContext::new(1000.0, 100.0, 50.0);
        let contour = inner(
            &["o", "300", "0", "340", "0", "340", "50", "300", "50", "300", "0"],
            Some(&profile),
        )
        .expect("Should parse");
        assert_eq!(contour.face, Some(Face::Top));
        assert!(contour.is_transverse);
    }

    #[test]
    fn test_inner_irregular() {
        let contour = inner(&["0", "0", "50", "10", "20", "40", "0", "0"], None).expect("Should parse");
        assert_eq!(contour.contour_kind, ContourKind::Irregular);
    }
}
