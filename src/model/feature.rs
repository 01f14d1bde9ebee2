//! Decoded features: one variant per block kind.

use serde::{Deserialize, Serialize};

use super::{BlockKind, CutRegion, EndMarker, Face, Point2D, ProfileHeader, WorkPlane};
use crate::config::angle::sweep_degrees;
use crate::config::float_cmp::approx_zero;

/// Shape class of a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourKind {
    Rectangular,
    Circular,
    Oval,
    #[default]
    Irregular,
}

/// External silhouette modification (AK).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OuterContour {
    pub points: Vec<Point2D>,
    pub face: Option<Face>,
    /// Declared closed; outer contours always are.
    pub closed: bool,
    pub work_plane: WorkPlane,
    /// Material removed relative to the full reference rectangle.
    pub cut_regions: Vec<CutRegion>,
}

/// Internal cutout (IK).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InnerContour {
    pub points: Vec<Point2D>,
    pub contour_kind: ContourKind,
    pub face: Option<Face>,
    /// 0 means through the material.
    pub depth: f64,
    /// Spans the full cross dimension of its face.
    pub is_transverse: bool,
    pub closed: bool,
}

/// Cut class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutKind {
    Circular,
    #[default]
    Rectangular,
    Angular,
    Notch,
    Bevel,
}

/// Straight or rectangular cut (SC).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cut {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees.
    pub angle: f64,
    pub radius: Option<f64>,
    pub cut_kind: CutKind,
    pub depth: Option<f64>,
    pub face: Option<Face>,
    pub work_plane: WorkPlane,
}

/// One circular arc of an arc contour. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArcSegment {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub clockwise: bool,
}

impl ArcSegment {
    fn point_at(&self, degrees: f64) -> Point2D {
        let rad = degrees.to_radians();
        Point2D::new(
            self.center_x + self.radius * rad.cos(),
            self.center_y + self.radius * rad.sin(),
        )
    }

    pub fn start_point(&self) -> Point2D {
        self.point_at(self.start_angle)
    }

    pub fn end_point(&self) -> Point2D {
        self.point_at(self.end_angle)
    }

    /// Swept angle in degrees, in (0, 360].
    pub fn sweep(&self) -> f64 {
        sweep_degrees(self.start_angle, self.end_angle, self.clockwise)
    }

    /// Arc length.
    pub fn length(&self) -> f64 {
        self.radius * self.sweep().to_radians()
    }
}

/// Arc contour (KA).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArcContour {
    pub arcs: Vec<ArcSegment>,
    pub face: Option<Face>,
}

/// How a free-form contour reaches a point from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    #[default]
    Line,
    Arc,
    Bulge,
    Bezier,
    Spline,
}

impl SegmentKind {
    /// Parse a segment code letter.
    pub fn from_code(token: &str) -> Option<Self> {
        match token {
            "L" | "l" => Some(SegmentKind::Line),
            "A" | "a" | "C" | "c" => Some(SegmentKind::Arc),
            "B" | "b" => Some(SegmentKind::Bulge),
            "S" | "s" => Some(SegmentKind::Bezier),
            "P" | "p" => Some(SegmentKind::Spline),
            _ => None,
        }
    }
}

/// Vertex of a free-form contour.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContourPoint {
    pub x: f64,
    pub y: f64,
    pub segment_kind: SegmentKind,
    pub radius: Option<f64>,
    pub center: Option<Point2D>,
    pub bulge: Option<f64>,
    pub control_points: Option<Vec<Point2D>>,
    pub tension: Option<f64>,
}

impl ContourPoint {
    /// A point reached by a straight line.
    pub fn line(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Free-form contour (UE).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FreeformContour {
    pub points: Vec<ContourPoint>,
    pub closed: bool,
    pub contour_kind: ContourKind,
    pub work_plane: WorkPlane,
}

impl FreeformContour {
    /// Vertex positions in order.
    pub fn vertices(&self) -> Vec<Point2D> {
        self.points.iter().map(ContourPoint::point).collect()
    }

    /// Polyline length through the vertices.
    pub fn polyline_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| w[0].point().distance_to(&w[1].point()))
            .sum()
    }
}

/// Hole class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleKind {
    #[default]
    Round,
    Slotted,
    Rectangular,
}

/// Hole (BO).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hole {
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
    /// 0 through, positive blind.
    pub depth: f64,
    pub angle: Option<f64>,
    pub face: Option<Face>,
    pub work_plane: WorkPlane,
    pub hole_kind: HoleKind,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub slot_length: Option<f64>,
}

impl Hole {
    pub fn is_through(&self) -> bool {
        approx_zero(self.depth)
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Punch mark (PU).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Punch {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub diameter: f64,
    pub angle: f64,
    pub work_plane: WorkPlane,
    pub tool_number: Option<u32>,
}

/// How a marking is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingMethod {
    #[default]
    Scribe,
    Stamp,
    Laser,
    Paint,
}

impl MarkingMethod {
    /// Parse a method keyword.
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "scribe" => Some(MarkingMethod::Scribe),
            "stamp" => Some(MarkingMethod::Stamp),
            "laser" => Some(MarkingMethod::Laser),
            "paint" => Some(MarkingMethod::Paint),
            _ => None,
        }
    }
}

/// Text marking (SI).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Marking {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub height: f64,
    pub angle: f64,
    pub depth: f64,
    pub face: Option<Face>,
    pub work_plane: WorkPlane,
    pub method: MarkingMethod,
}

/// A decoded, immutable block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feature {
    Header(ProfileHeader),
    OuterContour(OuterContour),
    InnerContour(InnerContour),
    Cut(Cut),
    ArcContour(ArcContour),
    FreeformContour(FreeformContour),
    Hole(Hole),
    Punch(Punch),
    Marking(Marking),
    End(EndMarker),
}

impl Feature {
    /// Block kind this feature was decoded from.
    pub fn kind(&self) -> BlockKind {
        match self {
            Feature::Header(_) => BlockKind::Header,
            Feature::OuterContour(_) => BlockKind::OuterContour,
            Feature::InnerContour(_) => BlockKind::InnerContour,
            Feature::Cut(_) => BlockKind::Cut,
            Feature::ArcContour(_) => BlockKind::ArcContour,
            Feature::FreeformContour(_) => BlockKind::FreeformContour,
            Feature::Hole(_) => BlockKind::Hole,
            Feature::Punch(_) => BlockKind::Punch,
            Feature::Marking(_) => BlockKind::Marking,
            Feature::End(_) => BlockKind::End,
        }
    }

    /// Descriptive type name, refined by the variant's own classification.
    pub fn type_name(&self) -> &'static str {
        match self {
            Feature::Header(_) => "profile_header",
            Feature::OuterContour(_) => "outer_contour",
            Feature::InnerContour(_) => "inner_contour",
            Feature::Cut(cut) => match cut.cut_kind {
                CutKind::Notch => "notch_cut",
                CutKind::Bevel => "bevel_cut",
                CutKind::Angular => "angle_cut",
                CutKind::Circular | CutKind::Rectangular => {
                    if approx_zero(cut.angle) {
                        "straight_cut"
                    } else {
                        "angle_cut"
                    }
                }
            },
            Feature::ArcContour(_) => "arc_contour",
            Feature::FreeformContour(_) => "freeform_contour",
            Feature::Hole(hole) => match hole.hole_kind {
                HoleKind::Slotted => "slot",
                HoleKind::Round | HoleKind::Rectangular => "hole",
            },
            Feature::Punch(_) => "punch_mark",
            Feature::Marking(_) => "marking",
            Feature::End(_) => "end_marker",
        }
    }

    /// Face the feature applies to, if it carries one.
    pub fn face(&self) -> Option<Face> {
        match self {
            Feature::OuterContour(c) => c.face,
            Feature::InnerContour(c) => c.face,
            Feature::Cut(c) => c.face,
            Feature::ArcContour(c) => c.face,
            Feature::Hole(h) => h.face,
            Feature::Marking(m) => m.face,
            Feature::Header(_)
            | Feature::FreeformContour(_)
            | Feature::Punch(_)
            | Feature::End(_) => None,
        }
    }

    pub fn as_hole(&self) -> Option<&Hole> {
        match self {
            Feature::Hole(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_marking(&self) -> Option<&Marking> {
        match self {
            Feature::Marking(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_header(&self) -> Option<&ProfileHeader> {
        match self {
            Feature::Header(h) => Some(h),
            _ => None,
        }
    }
}
