//! Data model types for NC block decoding.

mod block;
mod face;
mod feature;
mod geometry;
mod profile;

pub use block::{BlockKind, RawBlock};
pub use face::{Face, WorkPlane};
pub use feature::{
    ArcContour, ArcSegment, ContourKind, ContourPoint, Cut, CutKind, Feature, FreeformContour,
    Hole, HoleKind, InnerContour, Marking, MarkingMethod, OuterContour, Punch, SegmentKind,
};
pub use geometry::{Bounds, CutRegion, Point2D};
pub use profile::{EndMarker, ProfileContext, ProfileHeader, ProfileKind};
