//! Arc contour (KA) decoder.

use tracing::{debug, trace};

use super::fields::{detect_encoding, face_token, parse_number, split_face_prefix, Encoding, Fields};
use super::registry::DecodeContext;
use crate::error::{DecodeError, DecodeResult};
use crate::model::{ArcContour, ArcSegment, Feature};

/// cx, cy, r, start, end, direction.
const STANDARD_STRIDE: usize = 6;
/// cx, cy, signed r, start, end.
const LEGACY_STRIDE: usize = 5;

/// Parse a direction token: `1`/`cw` clockwise, `0`/`ccw` counter-clockwise.
fn parse_direction(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "cw" => Some(true),
        "ccw" => Some(false),
        _ => match parse_number(token) {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
    }
}

/// Decode a KA block.
pub fn decode_arc_contour(fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<ArcContour> {
    let encoding = detect_encoding(fields);
    let mut face = None;
    let mut tokens = Vec::new();

    for token in fields.iter() {
        if let Some(f) = face_token(token) {
            face.get_or_insert(f);
            continue;
        }
        if let (Some(f), _) = split_face_prefix(token) {
            face.get_or_insert(f);
        }
        tokens.push(token);
    }

    let stride = match encoding {
        Encoding::Standard => STANDARD_STRIDE,
        Encoding::Legacy => LEGACY_STRIDE,
    };
    if tokens.len() < stride {
        return Err(DecodeError::TooFewFields {
            kind: fields.kind(),
            minimum: stride,
            found: tokens.len(),
        });
    }

    let groups = tokens.chunks_exact(stride);
    if !groups.remainder().is_empty() {
        trace!(dropped = groups.remainder().len(), "dropping incomplete arc group");
    }

    let names = ["center_x", "center_y", "radius", "start_angle", "end_angle"];
    let mut arcs = Vec::new();
    for group in groups {
        let mut values = [0.0; 5];
        for (slot, (token, name)) in values.iter_mut().zip(group.iter().zip(names)) {
            *slot = parse_number(token).ok_or_else(|| fields.invalid(name, token))?;
        }
        let [center_x, center_y, radius, start_angle, end_angle] = values;

        let arc = match encoding {
            Encoding::Standard => {
                let clockwise = parse_direction(group[5])
                    .ok_or_else(|| fields.invalid("direction", group[5]))?;
                ArcSegment {
                    center_x,
                    center_y,
                    radius,
                    start_angle,
                    end_angle,
                    clockwise,
                }
            }
            Encoding::Legacy => ArcSegment {
                center_x,
                center_y,
                radius: radius.abs(),
                start_angle,
                end_angle,
                clockwise: radius < 0.0,
            },
        };
        arcs.push(arc);
    }

    debug!(?encoding, arcs = arcs.len(), "arc contour decoded");
    Ok(ArcContour { arcs, face })
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_arc_contour(fields, ctx).map(Feature::ArcContour)
}
