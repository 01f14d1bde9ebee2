//! Plane geometry primitives shared by all features.

use serde::{Deserialize, Serialize};

/// A point in the plane of a face. No unit conversion is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates are within `tol` of `other`.
    pub fn coincides(&self, other: &Point2D, tol: f64) -> bool {
        (self.x - other.x).abs() < tol && (self.y - other.y).abs() < tol
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds of a point set. Always derived, never stored on a feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Bounds of a point set, `None` when empty.
    pub fn of(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Ratio of the longer side to the shorter one; infinite for degenerate bounds.
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width().max(self.height());
        let short = self.width().min(self.height());
        if short <= 0.0 {
            f64::INFINITY
        } else {
            long / short
        }
    }
}

/// Rectangular region of material removed from the reference rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CutRegion {
    /// Region spanning two corners, normalised so width/height are positive.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2D> {
        coords.iter().copied().map(Point2D::from).collect()
    }

    #[test]
    fn test_distance() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_of_points() {
        let bounds = Bounds::of(&pts(&[(10.0, 5.0), (-2.0, 7.0), (4.0, -1.0)])).unwrap();
        assert_eq!(bounds.min_x, -2.0);
        assert_eq!(bounds.max_x, 10.0);
        assert_eq!(bounds.min_y, -1.0);
        assert_eq!(bounds.max_y, 7.0);
        assert!(Bounds::of(&[]).is_none());
    }

    #[test]
    fn test_aspect_ratio() {
        let bounds = Bounds::of(&pts(&[(0.0, 0.0), (100.0, 50.0)])).unwrap();
        assert!((bounds.aspect_ratio() - 2.0).abs() < 1e-9);
        let flat = Bounds::of(&pts(&[(0.0, 0.0), (100.0, 0.0)])).unwrap();
        assert!(flat.aspect_ratio().is_infinite());
    }

    #[test]
    fn test_cut_region_from_corners() {
        let region = CutRegion::from_corners(50.0, 30.0, 10.0, 0.0);
        assert_eq!(region.x, 10.0);
        assert_eq!(region.y, 0.0);
        assert_eq!(region.width, 40.0);
        assert_eq!(region.height, 30.0);
        assert_eq!(region.area(), 1200.0);
    }
}
