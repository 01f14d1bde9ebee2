//! Hole (BO) decoder.

use tracing::{debug, trace};

use super::fields::{
    classify_trailing, detect_encoding, face_token, parse_number, parse_work_plane,
    split_face_prefix, Encoding, Fields, TrailingValue,
};
use super::registry::DecodeContext;
use crate::error::{DecodeError, DecodeResult};
use crate::model::{Feature, Hole, HoleKind};

/// x, y, diameter.
const MIN_VALUES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Slot,
    Rect,
}

fn marker(token: &str) -> Option<Marker> {
    match token.to_ascii_lowercase().as_str() {
        "l" | "slot" => Some(Marker::Slot),
        "r" | "rect" => Some(Marker::Rect),
        _ => None,
    }
}

/// Next token as the number a marker requires.
fn take_number<'a>(
    fields: &Fields<'a>,
    tokens: &mut impl Iterator<Item = &'a str>,
    name: &str,
) -> DecodeResult<f64> {
    let token = tokens.next().ok_or_else(|| DecodeError::MissingField {
        kind: fields.kind(),
        field: name.to_string(),
    })?;
    parse_number(token).ok_or_else(|| fields.invalid(name, token))
}

/// Decode a BO block.
///
/// Standard: `x y diameter [depth] [angle] [E#]`. Legacy: a face code,
/// then `x y diameter [depth]` with optional trailing values. Either may
/// carry `l <length>` for a slot or `r <width> <height>` for a
/// rectangular hole.
pub fn decode_hole(fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<Hole> {
    let encoding = detect_encoding(fields);
    let mut hole = Hole::default();
    let mut values = Vec::new();
    let mut tokens = fields.iter();

    while let Some(token) = tokens.next() {
        if let Some(plane) = parse_work_plane(token) {
            hole.work_plane = plane;
        } else if let Some(face) = face_token(token) {
            hole.face.get_or_insert(face);
        } else if let Some(m) = marker(token) {
            match m {
                Marker::Slot => {
                    hole.hole_kind = HoleKind::Slotted;
                    hole.slot_length = Some(take_number(fields, &mut tokens, "slot_length")?);
                }
                Marker::Rect => {
                    hole.hole_kind = HoleKind::Rectangular;
                    hole.width = Some(take_number(fields, &mut tokens, "width")?);
                    hole.height = Some(take_number(fields, &mut tokens, "height")?);
                }
            }
        } else if let Some(value) = parse_number(token) {
            if let (Some(face), _) = split_face_prefix(token) {
                hole.face.get_or_insert(face);
            }
            values.push(value);
        } else if values.len() < MIN_VALUES {
            return Err(fields.invalid(["x", "y", "diameter"][values.len()], token));
        } else {
            trace!(token, "dropping unknown hole token");
        }
    }

    if values.len() < MIN_VALUES {
        return Err(DecodeError::TooFewFields {
            kind: fields.kind(),
            minimum: MIN_VALUES,
            found: values.len(),
        });
    }

    hole.x = values[0];
    hole.y = values[1];
    hole.diameter = values[2];
    hole.depth = values.get(3).copied().unwrap_or(0.0);

    match encoding {
        Encoding::Standard => {
            hole.angle = values.get(4).copied();
            for value in values.iter().skip(5) {
                trace!(value, "dropping extra hole value");
            }
        }
        Encoding::Legacy => {
            for &value in values.iter().skip(4) {
                match classify_trailing(value) {
                    Some(TrailingValue::Angle(a)) if hole.angle.is_none() => hole.angle = Some(a),
                    other => trace!(value, guess = ?other, "dropping trailing hole value"),
                }
            }
        }
    }

    if let (HoleKind::Slotted, Some(length)) = (hole.hole_kind, hole.slot_length) {
        hole.width = Some(hole.diameter + length);
        hole.height = Some(hole.diameter);
    }

    debug!(?encoding, kind = ?hole.hole_kind, x = hole.x, y = hole.y, "hole decoded");
    Ok(hole)
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_hole(fields, ctx).map(Feature::Hole)
}
