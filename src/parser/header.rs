//! Piece header (ST) decoder.
//!
//! Identification fields come first, then a profile-kind marker, then a
//! dimension block whose meaning depends on the layout the marker selects.
//! The layout is fixed before any dimension is read.

use tracing::{debug, trace};

use super::fields::{parse_number, Fields};
use super::registry::DecodeContext;
use crate::error::{DecodeError, DecodeResult};
use crate::model::{Feature, ProfileHeader, ProfileKind};

/// Identification fields before the marker: order, drawing, phase, piece,
/// steel grade, quantity, profile name.
const ID_FIELDS: usize = 7;

/// Mandatory dimensions of every layout.
const MIN_DIMENSIONS: usize = 3;

/// Dimension block layout of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// I, U, L, T, C, Z and special sections.
    Standard,
    /// Flat plate: length, width, thickness.
    Plate,
    /// Tubes: length, diameter (or height and width), wall.
    Tube,
}

/// Where the profile-kind marker sits and what it says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Marker {
    index: usize,
    layout: HeaderLayout,
    kind: ProfileKind,
}

fn marker_at(index: usize, token: &str) -> Option<Marker> {
    let upper = token.to_ascii_uppercase();
    let (layout, kind) = match upper.as_str() {
        "PL" => (HeaderLayout::Plate, ProfileKind::Plate),
        "TUBE" => (HeaderLayout::Tube, ProfileKind::RoundTube),
        code => {
            let kind = ProfileKind::from_code(code)?;
            let layout = match kind {
                ProfileKind::Plate => HeaderLayout::Plate,
                k if k.is_tube() => HeaderLayout::Tube,
                _ => HeaderLayout::Standard,
            };
            (layout, kind)
        }
    };
    Some(Marker { index, layout, kind })
}

/// The marker normally follows the seven identification fields. Otherwise
/// the first marker-like token after them is taken, so a piece number such
/// as `B` is never read as a kind. Only a header too short to hold the
/// identification block is scanned from the start.
fn find_marker(fields: &Fields<'_>) -> Option<Marker> {
    let scan_from = if fields.len() > ID_FIELDS { ID_FIELDS } else { 0 };
    fields
        .iter()
        .enumerate()
        .skip(scan_from)
        .find_map(|(index, token)| marker_at(index, token))
}

/// Detect the dimension layout from the marker tokens.
pub fn detect_header_layout(fields: &Fields<'_>) -> HeaderLayout {
    find_marker(fields).map_or(HeaderLayout::Standard, |m| m.layout)
}

/// Decode an ST block.
pub fn decode_header(fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<ProfileHeader> {
    let marker = find_marker(fields);
    let (layout, kind, dims_start, id_end) = match marker {
        Some(m) => (m.layout, m.kind, m.index + 1, m.index),
        None => (
            HeaderLayout::Standard,
            ProfileKind::Special,
            ID_FIELDS,
            ID_FIELDS.min(fields.len()),
        ),
    };
    debug!(?layout, ?kind, dims_start, "header layout detected");

    let mut header = ProfileHeader {
        profile_kind: kind,
        quantity: 1,
        ..Default::default()
    };

    let mut slots = fields.tokens()[..id_end].iter().copied();
    header.order_number = slots.next().unwrap_or_default().to_string();
    header.drawing_number = slots.next().unwrap_or_default().to_string();
    header.phase_number = slots.next().unwrap_or_default().to_string();
    header.piece_number = slots.next().unwrap_or_default().to_string();
    header.steel_grade = slots.next().unwrap_or_default().to_string();
    if let Some(token) = slots.next() {
        let quantity = parse_number(token)
            .filter(|q| *q >= 0.0)
            .ok_or_else(|| fields.invalid("quantity", token))?;
        header.quantity = quantity.round() as u32;
    }
    header.profile_name = slots.next().unwrap_or_default().to_string();
    for token in slots {
        trace!(token, "dropping extra identification field");
    }

    let dims: Vec<&str> = fields.tokens().get(dims_start..).unwrap_or_default().to_vec();
    if dims.len() < MIN_DIMENSIONS {
        return Err(DecodeError::TooFewFields {
            kind: fields.kind(),
            minimum: dims_start + MIN_DIMENSIONS,
            found: fields.len(),
        });
    }

    let names: &[&str] = match (layout, kind) {
        (HeaderLayout::Plate, _) => &["length", "width", "thickness", "weight", "painting_surface"],
        (HeaderLayout::Tube, ProfileKind::RectTube) => {
            &["length", "height", "width", "wall", "weight", "painting_surface"]
        }
        (HeaderLayout::Tube, _) => &["length", "diameter", "wall", "weight", "painting_surface"],
        (HeaderLayout::Standard, _) => &[
            "length",
            "height",
            "width",
            "flange_thickness",
            "web_thickness",
            "radius",
            "weight",
            "painting_surface",
        ],
    };

    let mut values = Vec::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        match dims.get(i) {
            Some(token) => match parse_number(token) {
                Some(v) => values.push(v),
                None if i < MIN_DIMENSIONS => return Err(fields.invalid(name, token)),
                None => {
                    trace!(token, field = *name, "optional header field is not a number");
                    values.push(0.0);
                }
            },
            None => values.push(0.0),
        }
    }
    for token in dims.iter().skip(names.len()) {
        trace!(token, "dropping extra header field");
    }

    match (layout, kind) {
        (HeaderLayout::Plate, _) => {
            header.length = values[0];
            header.height = values[1];
            header.width = values[2];
            header.web_thickness = values[2];
            header.flange_thickness = values[2];
            header.weight = values[3];
            header.painting_surface = values[4];
        }
        (HeaderLayout::Tube, ProfileKind::RectTube) => {
            header.length = values[0];
            header.height = values[1];
            header.width = values[2];
            header.web_thickness = values[3];
            header.flange_thickness = values[3];
            header.weight = values[4];
            header.painting_surface = values[5];
        }
        (HeaderLayout::Tube, _) => {
            header.length = values[0];
            header.height = values[1];
            header.width = values[1];
            header.radius = Some(values[1] / 2.0);
            header.web_thickness = values[2];
            header.flange_thickness = values[2];
            header.weight = values[3];
            header.painting_surface = values[4];
        }
        (HeaderLayout::Standard, _) => {
            header.length = values[0];
            header.height = values[1];
            header.width = values[2];
            header.flange_thickness = values[3];
            header.web_thickness = values[4];
            header.radius = Some(values[5]).filter(|r| *r > 0.0);
            header.weight = values[6];
            header.painting_surface = values[7];
        }
    }

    debug!(
        profile = %header.profile_name,
        kind = header.profile_kind.code(),
        length = header.length,
        "header decoded"
    );
    Ok(header)
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_header(fields, ctx).map(Feature::Header)
}
