//! Derivation of removed material against the profile's reference rectangle.

use tracing::debug;

use crate::config::{CLOSURE_TOLERANCE, X_CLUSTER_STEP};
use crate::model::{Bounds, CutRegion, Face, Point2D, ProfileContext};

/// Point count of the notch-extension outline (8 corners plus closing point).
const NOTCH_EXTENSION_POINTS: usize = 9;

/// Whether the contour spans the whole cross dimension of its face.
pub fn spans_cross_dimension(points: &[Point2D], face: Option<Face>, profile: &ProfileContext) -> bool {
    let cross = profile.cross_dimension(face);
    match Bounds::of(points) {
        Some(b) if cross > 0.0 => {
            b.min_y <= CLOSURE_TOLERANCE && b.max_y >= cross - CLOSURE_TOLERANCE
        }
        _ => false,
    }
}

/// Rectangles of the reference face (`length` x cross dimension) that the
/// observed outer contour no longer covers.
///
/// X insets at either end yield full-height regions. A nine-point outline
/// whose end narrows into an extension additionally yields the regions
/// above and below that extension.
pub fn derive_cut_regions(
    points: &[Point2D],
    face: Option<Face>,
    profile: &ProfileContext,
) -> Vec<CutRegion> {
    let cross = profile.cross_dimension(face);
    let length = profile.length;
    let Some(bounds) = Bounds::of(points) else {
        return Vec::new();
    };
    if length <= 0.0 || cross <= 0.0 {
        return Vec::new();
    }

    let mut regions = Vec::new();

    if bounds.min_x > CLOSURE_TOLERANCE {
        regions.push(CutRegion::from_corners(0.0, 0.0, bounds.min_x, cross));
    }
    if bounds.max_x < length - CLOSURE_TOLERANCE {
        regions.push(CutRegion::from_corners(bounds.max_x, 0.0, length, cross));
    }

    if points.len() == NOTCH_EXTENSION_POINTS {
        regions.extend(extension_regions(points, &bounds, cross));
    }

    debug!(
        face = ?face,
        regions = regions.len(),
        "derived cut regions"
    );
    regions
}

/// Distinct X values, rounded to the cluster step, ascending.
fn distinct_x(points: &[Point2D]) -> Vec<f64> {
    let mut xs: Vec<f64> = points
        .iter()
        .map(|p| (p.x / X_CLUSTER_STEP).round() * X_CLUSTER_STEP)
        .collect();
    xs.sort_by(|a, b| a.total_cmp(b));
    xs.dedup_by(|a, b| (*a - *b).abs() < X_CLUSTER_STEP / 2.0);
    xs
}

/// Y range of the points lying on a given X.
fn y_range_at(points: &[Point2D], x: f64) -> Option<(f64, f64)> {
    points
        .iter()
        .filter(|p| (p.x - x).abs() < X_CLUSTER_STEP)
        .fold(None, |acc, p| match acc {
            None => Some((p.y, p.y)),
            Some((lo, hi)) => Some((lo.min(p.y), hi.max(p.y))),
        })
}

fn extension_regions(points: &[Point2D], bounds: &Bounds, cross: f64) -> Vec<CutRegion> {
    let xs = distinct_x(points);
    if xs.len() < 3 {
        return Vec::new();
    }

    let narrower = |(lo, hi): (f64, f64)| hi - lo < bounds.height() - CLOSURE_TOLERANCE;

    let last = xs.len() - 1;
    let extension = y_range_at(points, bounds.max_x)
        .filter(|range| narrower(*range))
        .map(|range| (xs[last - 1], xs[last], range))
        .or_else(|| {
            y_range_at(points, bounds.min_x)
                .filter(|range| narrower(*range))
                .map(|range| (xs[0], xs[1], range))
        });

    let Some((x0, x1, (y_lo, y_hi))) = extension else {
        return Vec::new();
    };

    let mut regions = Vec::new();
    if y_lo > CLOSURE_TOLERANCE {
        regions.push(CutRegion::from_corners(x0, 0.0, x1, y_lo));
    }
    if y_hi < cross - CLOSURE_TOLERANCE {
        regions.push(CutRegion::from_corners(x0, y_hi, x1, cross));
    }
    regions
}
