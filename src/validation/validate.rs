//! Rule checks for decoded features.

use serde::{Deserialize, Serialize};

use crate::config::float_cmp::in_range;
use crate::config::{
    CLOSURE_TOLERANCE, CUT_EXTENT_MAX, EPS, FREEFORM_MAX_LENGTH, FREEFORM_MAX_POINTS,
    FREEFORM_MIN_LENGTH, HOLE_CLEARANCE_MARGIN, HOLE_DIAMETER_MAX, HOLE_DIAMETER_MIN,
    SUSPICIOUS_ASPECT_RATIO,
};
use crate::geometry::{analyze, is_closed, Winding};
use crate::model::{
    ArcContour, Bounds, Cut, Feature, FreeformContour, Hole, HoleKind, InnerContour, Marking,
    OuterContour, Point2D, ProfileHeader, Punch, SegmentKind,
};

/// Validation result with warnings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub is_valid: bool,
    /// Error messages.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    /// Create a failing result with an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            errors: vec![message.into()],
            ..Default::default()
        }
    }

    /// Add a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Add an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.is_valid {
            self.is_valid = false;
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Validate a single decoded feature.
pub fn validate_feature(feature: &Feature) -> ValidationResult {
    match feature {
        Feature::Header(h) => validate_header(h),
        Feature::OuterContour(c) => validate_outer_contour(c),
        Feature::InnerContour(c) => validate_inner_contour(c),
        Feature::Cut(c) => validate_cut(c),
        Feature::ArcContour(c) => validate_arc_contour(c),
        Feature::FreeformContour(c) => validate_freeform_contour(c),
        Feature::Hole(h) => validate_hole(h),
        Feature::Punch(p) => validate_punch(p),
        Feature::Marking(m) => validate_marking(m),
        Feature::End(_) => ValidationResult::ok(),
    }
}

/// Point count, closure and duplicate checks shared by closed contours.
fn check_contour_points(
    result: &mut ValidationResult,
    label: &str,
    points: &[Point2D],
    closed: bool,
    min_points: usize,
) {
    if points.len() < min_points {
        result.add_error(format!(
            "{}: at least {} points required, found {}",
            label,
            min_points,
            points.len()
        ));
        return;
    }

    if closed && !is_closed(points) {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            result.add_error(format!(
                "{}: marked closed but ends at ({}, {}) instead of ({}, {})",
                label, last.x, last.y, first.x, first.y
            ));
        }
    }

    // Duplicate intermediate points
    for index in crate::geometry::duplicate_points(points) {
        result.add_warning(format!("{}: point {} duplicates its predecessor", label, index + 1));
    }
}

fn validate_outer_contour(contour: &OuterContour) -> ValidationResult {
    let mut result = ValidationResult::ok();
    check_contour_points(&mut result, "Outer contour", &contour.points, contour.closed, 3);
    if !result.is_valid {
        return result;
    }

    let analysis = analyze(&contour.points);
    // Positive orientation sum, see `orientation_sum`.
    match analysis.winding {
        Winding::Clockwise => {
            result.add_warning("Outer contour: points run clockwise, counter-clockwise expected")
        }
        Winding::Degenerate => result.add_warning("Outer contour: encloses no area"),
        Winding::CounterClockwise => {}
    }

    if let Some(bounds) = analysis.bounds {
        let ratio = bounds.aspect_ratio();
        if ratio > SUSPICIOUS_ASPECT_RATIO && ratio.is_finite() {
            result.add_warning(format!(
                "Outer contour: suspicious aspect ratio {:.1} ({} x {})",
                ratio,
                bounds.width(),
                bounds.height()
            ));
        }
    }

    result
}

fn validate_inner_contour(contour: &InnerContour) -> ValidationResult {
    let mut result = ValidationResult::ok();
    check_contour_points(&mut result, "Inner contour", &contour.points, contour.closed, 3);

    if contour.depth < 0.0 {
        result.add_error(format!("Inner contour: negative depth {}", contour.depth));
    }
    if result.is_valid && analyze(&contour.points).area <= EPS {
        result.add_warning("Inner contour: encloses no area");
    }

    result
}

fn validate_cut(cut: &Cut) -> ValidationResult {
    let mut result = ValidationResult::ok();

    // Check dimensions
    if cut.width <= 0.0 || cut.height <= 0.0 {
        result.add_error(format!(
            "Cut: invalid dimensions ({}x{})",
            cut.width, cut.height
        ));
    }
    if let Some(radius) = cut.radius {
        if radius <= 0.0 {
            result.add_error(format!("Cut: radius must be positive, got {}", radius));
        }
    }
    if let Some(depth) = cut.depth {
        if depth < 0.0 {
            result.add_error(format!("Cut: negative depth {}", depth));
        }
    }
    if !in_range(cut.angle, -180.0, 180.0) {
        result.add_error(format!("Cut: angle {} outside [-180, 180]", cut.angle));
    }

    if cut.width > CUT_EXTENT_MAX || cut.height > CUT_EXTENT_MAX {
        result.add_warning(format!(
            "Cut: unusually large ({}x{}), typical maximum {}x{}",
            cut.width, cut.height, CUT_EXTENT_MAX, CUT_EXTENT_MAX
        ));
    }

    result
}

fn validate_arc_contour(contour: &ArcContour) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if contour.arcs.is_empty() {
        result.add_error("Arc contour: no arcs defined");
        return result;
    }

    for (idx, arc) in contour.arcs.iter().enumerate() {
        if arc.radius <= 0.0 {
            result.add_error(format!(
                "Arc contour, arc {}: radius must be positive, got {}",
                idx + 1,
                arc.radius
            ));
        }
    }

    // Consecutive arcs should join
    for (idx, pair) in contour.arcs.windows(2).enumerate() {
        let end = pair[0].end_point();
        let start = pair[1].start_point();
        if !end.coincides(&start, CLOSURE_TOLERANCE) {
            result.add_warning(format!(
                "Arc contour, arc {}: starts {:.3} away from the end of arc {}",
                idx + 2,
                end.distance_to(&start),
                idx + 1
            ));
        }
    }

    result
}

fn validate_freeform_contour(contour: &FreeformContour) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let vertices = contour.vertices();
    check_contour_points(&mut result, "Free-form contour", &vertices, contour.closed, 2);

    for (idx, point) in contour.points.iter().enumerate() {
        let bad_radius = point.radius.map_or(false, |r| r <= 0.0);
        if point.segment_kind == SegmentKind::Arc && bad_radius {
            result.add_error(format!(
                "Free-form contour, point {}: arc radius must be positive",
                idx + 1
            ));
        }
    }

    if contour.points.len() > FREEFORM_MAX_POINTS {
        result.add_warning(format!(
            "Free-form contour: very complex ({} points)",
            contour.points.len()
        ));
    }
    let length = contour.polyline_length();
    if length < FREEFORM_MIN_LENGTH {
        result.add_warning(format!("Free-form contour: very short ({:.3})", length));
    } else if length > FREEFORM_MAX_LENGTH {
        result.add_warning(format!("Free-form contour: very long ({:.1})", length));
    }

    result
}

fn validate_hole(hole: &Hole) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if hole.diameter <= 0.0 {
        result.add_error(format!("Hole: diameter must be positive, got {}", hole.diameter));
    }
    if hole.depth < 0.0 {
        result.add_error(format!("Hole: negative depth {}", hole.depth));
    }
    if let Some(angle) = hole.angle {
        if !in_range(angle, -90.0, 90.0) {
            result.add_error(format!("Hole: angle {} outside [-90, 90]", angle));
        }
    }

    match hole.hole_kind {
        HoleKind::Slotted => {
            if hole.slot_length.map_or(true, |l| l <= 0.0) {
                result.add_error("Hole: slot length must be positive");
            }
        }
        HoleKind::Rectangular => {
            let width = hole.width.unwrap_or(0.0);
            let height = hole.height.unwrap_or(0.0);
            if width <= 0.0 || height <= 0.0 {
                result.add_error(format!(
                    "Hole: invalid rectangular dimensions ({}x{})",
                    width, height
                ));
            }
        }
        HoleKind::Round => {}
    }

    if hole.diameter > 0.0 && !(HOLE_DIAMETER_MIN..=HOLE_DIAMETER_MAX).contains(&hole.diameter) {
        result.add_warning(format!(
            "Hole: diameter {} outside typical range {}..{}",
            hole.diameter, HOLE_DIAMETER_MIN, HOLE_DIAMETER_MAX
        ));
    }

    result
}

fn validate_punch(punch: &Punch) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if punch.diameter <= 0.0 {
        result.add_error(format!("Punch: diameter must be positive, got {}", punch.diameter));
    }
    if punch.depth < 0.0 {
        result.add_error(format!("Punch: negative depth {}", punch.depth));
    }
    if !in_range(punch.angle, -90.0, 90.0) {
        result.add_error(format!("Punch: angle {} outside [-90, 90]", punch.angle));
    }

    result
}

fn validate_marking(marking: &Marking) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if marking.text.trim().is_empty() {
        result.add_error("Marking: no text");
    }
    if marking.height <= 0.0 {
        result.add_error(format!("Marking: height must be positive, got {}", marking.height));
    }
    if marking.depth < 0.0 {
        result.add_error(format!("Marking: negative depth {}", marking.depth));
    }
    if !in_range(marking.angle, -360.0, 360.0) {
        result.add_warning(format!("Marking: angle {} beyond a full turn", marking.angle));
    }

    result
}

fn validate_header(header: &ProfileHeader) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if header.length <= 0.0 {
        result.add_error(format!("Header: length must be positive, got {}", header.length));
    }
    if header.height <= 0.0 || header.width <= 0.0 {
        result.add_error(format!(
            "Header: invalid cross-section ({}x{})",
            header.height, header.width
        ));
    }
    if header.quantity == 0 {
        result.add_warning("Header: quantity is zero");
    }
    if header.profile_name.is_empty() {
        result.add_warning("Header: missing profile name");
    }

    result
}

/// Cross-feature checks over a whole piece.
pub fn validate_features(features: &[Feature]) -> ValidationResult {
    let mut result = ValidationResult::ok();

    let headers = features.iter().filter(|f| f.as_header().is_some()).count();
    if headers > 1 {
        result.add_warning(format!("{} header records, expected one", headers));
    }

    // Near-coincident holes on the same face
    let holes: Vec<(usize, &Hole)> = features
        .iter()
        .enumerate()
        .filter_map(|(idx, f)| f.as_hole().map(|h| (idx, h)))
        .collect();
    for (i, (idx_a, a)) in holes.iter().enumerate() {
        for (idx_b, b) in holes.iter().skip(i + 1) {
            if a.face != b.face {
                continue;
            }
            let distance = a.center().distance_to(&b.center());
            let clearance = (a.diameter + b.diameter) / 2.0 + HOLE_CLEARANCE_MARGIN;
            if distance < clearance {
                result.add_warning(format!(
                    "Features {} and {}: holes {:.2} apart, minimum clearance {:.2}",
                    idx_a + 1,
                    idx_b + 1,
                    distance,
                    clearance
                ));
            }
        }
    }

    result
}

/// Bounding box of every located feature, for reports.
pub fn feature_extent(features: &[Feature]) -> Option<Bounds> {
    let points: Vec<Point2D> = features
        .iter()
        .flat_map(|f| match f {
            Feature::OuterContour(c) => c.points.clone(),
            Feature::InnerContour(c) => c.points.clone(),
            Feature::FreeformContour(c) => c.vertices(),
            Feature::Hole(h) => vec![h.center()],
            Feature::Cut(c) => vec![Point2D::new(c.x, c.y)],
            Feature::Punch(p) => vec![Point2D::new(p.x, p.y)],
            Feature::Marking(m) => vec![Point2D::new(m.x, m.y)],
            Feature::ArcContour(c) => c.arcs.iter().map(|a| a.start_point()).collect(),
            Feature::Header(_) | Feature::End(_) => Vec::new(),
        })
        .collect();
    Bounds::of(&points)
}
