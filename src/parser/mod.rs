//! Per-block decoders and the registry that dispatches to them.

pub mod arc;
pub mod contour;
pub mod cut;
pub mod end;
pub mod fields;
pub mod freeform;
pub mod header;
pub mod hole;
pub mod layout;
pub mod marking;
pub mod punch;
mod registry;

pub use end::{detect_end_encoding, EndEncoding};
pub use fields::{detect_encoding, Encoding, Fields};
pub use freeform::{detect_freeform_encoding, FreeformEncoding};
pub use header::{detect_header_layout, HeaderLayout};
pub use layout::{classify_contour_layout, ContourLayout, LayoutClassifier, LayoutRule};
pub use registry::{DecodeContext, DecodeFn, DecoderRegistry};
