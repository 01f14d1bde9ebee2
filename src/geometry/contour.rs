//! Contour analysis: closure, classification, area and winding.

use serde::{Deserialize, Serialize};

use crate::config::{
    AXIS_TOLERANCE, CIRCULARITY_TOLERANCE, CLOSURE_TOLERANCE, EPS, MIN_ROUND_POINTS,
    OVAL_MAX_RATIO, OVAL_MIN_RATIO,
};
use crate::model::{Bounds, ContourKind, Point2D};

/// Winding direction of a contour in y-up coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winding {
    CounterClockwise,
    Clockwise,
    /// Zero enclosed area.
    Degenerate,
}

/// Check if the first and last points coincide within the closure tolerance.
pub fn is_closed(points: &[Point2D]) -> bool {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() >= 2 => {
            first.coincides(last, CLOSURE_TOLERANCE)
        }
        _ => false,
    }
}

/// Points without the repeated closing point.
pub fn distinct_points(points: &[Point2D]) -> &[Point2D] {
    if is_closed(points) {
        &points[..points.len() - 1]
    } else {
        points
    }
}

/// Shoelace sum `½·Σ(xᵢyᵢ₊₁ − xᵢ₊₁yᵢ)`, wrapping from the last point to the first.
pub fn signed_area(points: &[Point2D]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let sum: f64 = (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    sum / 2.0
}

/// Enclosed area.
pub fn area(points: &[Point2D]) -> f64 {
    signed_area(points).abs()
}

/// Edge sum `Σ(xᵢ₊₁−xᵢ)(yᵢ₊₁+yᵢ)`, wrapping from the last point to the first.
///
/// Negative for counter-clockwise contours, positive for clockwise ones
/// (y up). Outer contours are expected counter-clockwise, so the clockwise
/// warning fires on a positive sum. A rule read as "warn when the sum is
/// negative" assumes y down and flags the opposite direction.
pub fn orientation_sum(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }
    (0..n)
        .map(|i| {
            let a = points[i];
            let b = points[(i + 1) % n];
            (b.x - a.x) * (b.y + a.y)
        })
        .sum()
}

/// Winding direction from the sign of the edge sum.
pub fn winding(points: &[Point2D]) -> Winding {
    let sum = orientation_sum(points);
    if sum < -EPS {
        Winding::CounterClockwise
    } else if sum > EPS {
        Winding::Clockwise
    } else {
        Winding::Degenerate
    }
}

/// Open polyline length through all points.
pub fn perimeter(points: &[Point2D]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Vertex average, ignoring the closing point.
pub fn centroid(points: &[Point2D]) -> Option<Point2D> {
    let pts = distinct_points(points);
    if pts.is_empty() {
        return None;
    }
    let n = pts.len() as f64;
    let (sx, sy) = pts.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point2D::new(sx / n, sy / n))
}

/// Indices of points that repeat their predecessor.
pub fn duplicate_points(points: &[Point2D]) -> Vec<usize> {
    points
        .windows(2)
        .enumerate()
        .filter(|(_, w)| w[0].coincides(&w[1], CLOSURE_TOLERANCE))
        .map(|(i, _)| i + 1)
        .collect()
}

fn is_axis_aligned(a: &Point2D, b: &Point2D) -> bool {
    (a.x - b.x).abs() < AXIS_TOLERANCE || (a.y - b.y).abs() < AXIS_TOLERANCE
}

fn is_rectangular(points: &[Point2D]) -> bool {
    let edges: Vec<(Point2D, Point2D)> = match points.len() {
        5 if is_closed(points) => points.windows(2).map(|w| (w[0], w[1])).collect(),
        4 => (0..4).map(|i| (points[i], points[(i + 1) % 4])).collect(),
        _ => return false,
    };
    edges.iter().all(|(a, b)| is_axis_aligned(a, b)) && area(points) > EPS
}

fn is_circular(points: &[Point2D]) -> bool {
    let Some(center) = centroid(points) else {
        return false;
    };
    let pts = distinct_points(points);
    let distances: Vec<f64> = pts.iter().map(|p| p.distance_to(&center)).collect();
    let n = distances.len() as f64;
    let mean = distances.iter().sum::<f64>() / n;
    if mean <= EPS {
        return false;
    }
    let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() < CIRCULARITY_TOLERANCE * mean
}

/// Classify a contour's shape.
pub fn classify(points: &[Point2D]) -> ContourKind {
    if is_rectangular(points) {
        return ContourKind::Rectangular;
    }
    if points.len() >= MIN_ROUND_POINTS {
        if is_circular(points) {
            return ContourKind::Circular;
        }
        if let Some(bounds) = Bounds::of(points) {
            let ratio = bounds.aspect_ratio();
            if ratio > OVAL_MIN_RATIO && ratio < OVAL_MAX_RATIO {
                return ContourKind::Oval;
            }
        }
    }
    ContourKind::Irregular
}

/// Everything the validators and decoders want to know about a contour.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourAnalysis {
    pub closed: bool,
    pub kind: ContourKind,
    pub area: f64,
    pub winding: Winding,
    pub perimeter: f64,
    pub bounds: Option<Bounds>,
    pub duplicates: Vec<usize>,
}

/// Run every contour measurement once.
pub fn analyze(points: &[Point2D]) -> ContourAnalysis {
    ContourAnalysis {
        closed: is_closed(points),
        kind: classify(points),
        area: area(points),
        winding: winding(points),
        perimeter: perimeter(points),
        bounds: Bounds::of(points),
        duplicates: duplicate_points(points),
    }
}
