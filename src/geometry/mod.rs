//! Geometric contour analyzer shared by all contour-bearing decoders.

mod contour;
mod regions;

pub use contour::{
    analyze, area, centroid, classify, distinct_points, duplicate_points, is_closed,
    orientation_sum, perimeter, signed_area, winding, ContourAnalysis, Winding,
};
pub use regions::{derive_cut_regions, spans_cross_dimension};
