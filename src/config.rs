//! Configuration constants and settings for the decoder.

use serde::{Deserialize, Serialize};

/// Floating-point comparison epsilon.
pub const EPS: f64 = 0.0001;

/// Maximum per-axis gap between first and last point of a closed contour.
pub const CLOSURE_TOLERANCE: f64 = 0.01;

/// Maximum off-axis drift for an edge to count as axis-aligned.
pub const AXIS_TOLERANCE: f64 = 0.01;

/// Maximum relative deviation of centroid distances for a circular contour.
pub const CIRCULARITY_TOLERANCE: f64 = 0.05;

/// Minimum point count for circular/oval classification.
pub const MIN_ROUND_POINTS: usize = 12;

/// Exclusive lower bound of the bounding-box aspect ratio of an oval.
pub const OVAL_MIN_RATIO: f64 = 1.2;

/// Exclusive upper bound of the bounding-box aspect ratio of an oval.
pub const OVAL_MAX_RATIO: f64 = 3.0;

/// Aspect ratio below which a cut is considered circular.
pub const CUT_CIRCULAR_RATIO: f64 = 1.1;

/// Aspect ratio below which a cut is considered rectangular.
pub const CUT_RECTANGULAR_RATIO: f64 = 3.0;

/// Default punch mark depth.
pub const DEFAULT_PUNCH_DEPTH: f64 = 0.5;

/// Default punch mark diameter.
pub const DEFAULT_PUNCH_DIAMETER: f64 = 3.0;

/// Default marking text height.
pub const DEFAULT_MARKING_HEIGHT: f64 = 10.0;

/// Default marking depth.
pub const DEFAULT_MARKING_DEPTH: f64 = 0.1;

/// Typical hole diameter range; outside it a warning is raised.
pub const HOLE_DIAMETER_MIN: f64 = 1.0;
pub const HOLE_DIAMETER_MAX: f64 = 500.0;

/// Largest typical cut extent along either axis.
pub const CUT_EXTENT_MAX: f64 = 2000.0;

/// Extra clearance added to the radius sum when checking hole proximity.
pub const HOLE_CLEARANCE_MARGIN: f64 = 5.0;

/// Free-form contours with more points than this are flagged as complex.
pub const FREEFORM_MAX_POINTS: usize = 1000;

/// Free-form contour perimeter bounds for the length advisory.
pub const FREEFORM_MIN_LENGTH: f64 = 1.0;
pub const FREEFORM_MAX_LENGTH: f64 = 50_000.0;

/// Bounding-box aspect ratio above which an outer contour looks suspicious.
pub const SUSPICIOUS_ASPECT_RATIO: f64 = 200.0;

/// Rounding step used when clustering X values of notch extensions.
pub const X_CLUSTER_STEP: f64 = 0.1;

/// Heuristic thresholds for the matrix vs grouped contour layout decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourLayoutRules {
    /// Minimum share of face-coded fields for the face-density rule.
    pub min_face_ratio: f64,
    /// Minimum numeric field count before the zero-column rule applies.
    pub min_zero_column_fields: usize,
}

impl Default for ContourLayoutRules {
    fn default() -> Self {
        Self {
            min_face_ratio: 0.2,
            min_zero_column_fields: 9,
        }
    }
}

/// Decoder options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecoderOptions {
    /// Derive missing cut regions for outer contours.
    pub derive_cut_regions: bool,
    /// Contour layout heuristic thresholds.
    pub layout_rules: ContourLayoutRules,
}

impl DecoderOptions {
    /// Create options with cut-region derivation switched on.
    pub fn with_cut_regions() -> Self {
        Self {
            derive_cut_regions: true,
            ..Default::default()
        }
    }
}

/// Utility functions for floating-point comparisons.
pub mod float_cmp {
    use super::EPS;

    /// Check if two floats are approximately equal.
    #[inline]
    pub fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Check if a float is approximately zero.
    #[inline]
    pub fn approx_zero(a: f64) -> bool {
        a.abs() < EPS
    }

    /// Check if a is in range [min, max] with epsilon tolerance.
    #[inline]
    pub fn in_range(a: f64, min: f64, max: f64) -> bool {
        a >= min - EPS && a <= max + EPS
    }
}

/// Utility functions for angle operations.
pub mod angle {
    /// Normalize angle to 0-360 range (exclusive of 360).
    #[inline]
    pub fn normalize_degrees(angle: f64) -> f64 {
        let mut a = angle % 360.0;
        if a < 0.0 {
            a += 360.0;
        }
        if a >= 360.0 || a == 0.0 {
            a = 0.0;
        }
        a
    }

    /// Sweep in degrees from `start` to `end` in the given direction, in (0, 360].
    pub fn sweep_degrees(start: f64, end: f64, clockwise: bool) -> f64 {
        let delta = if clockwise {
            normalize_degrees(start - end)
        } else {
            normalize_degrees(end - start)
        };
        if delta == 0.0 {
            360.0
        } else {
            delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = DecoderOptions::default();
        assert!(!options.derive_cut_regions);
        assert!((options.layout_rules.min_face_ratio - 0.2).abs() < EPS);
        assert!(DecoderOptions::with_cut_regions().derive_cut_regions);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(float_cmp::approx_eq(angle::normalize_degrees(-90.0), 270.0));
        assert!(float_cmp::approx_eq(angle::normalize_degrees(360.0), 0.0));
        assert!(float_cmp::approx_eq(angle::normalize_degrees(450.0), 90.0));
    }

    #[test]
    fn test_sweep_degrees() {
        assert!(float_cmp::approx_eq(angle::sweep_degrees(0.0, 90.0, false), 90.0));
        assert!(float_cmp::approx_eq(angle::sweep_degrees(0.0, 90.0, true), 270.0));
        assert!(float_cmp::approx_eq(angle::sweep_degrees(45.0, 45.0, false), 360.0));
    }

    #[test]
    fn test_in_range() {
        assert!(float_cmp::in_range(90.0, -90.0, 90.0));
        assert!(!float_cmp::in_range(90.5, -90.0, 90.0));
    }
}
