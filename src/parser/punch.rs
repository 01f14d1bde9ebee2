//! Punch mark (PU) decoder.

use tracing::{debug, trace};

use super::fields::{detect_encoding, parse_number, parse_work_plane, token_face, Fields};
use super::registry::DecodeContext;
use crate::config::{DEFAULT_PUNCH_DEPTH, DEFAULT_PUNCH_DIAMETER};
use crate::error::{DecodeError, DecodeResult};
use crate::model::{Feature, Punch};

/// x, y.
const MIN_VALUES: usize = 2;

/// Parse a tool token `T<n>`.
fn parse_tool(token: &str) -> Option<u32> {
    token
        .strip_prefix('T')
        .or_else(|| token.strip_prefix('t'))
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|rest| rest.parse().ok())
}

/// Decode a PU block: `[face] x y [depth] [diameter] [angle] [E#] [T<n>]`.
///
/// Punches carry no face of their own; a legacy face code selects the
/// face's work plane unless an explicit `E` token is present.
pub fn decode_punch(fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<Punch> {
    let encoding = detect_encoding(fields);
    let mut face = None;
    let mut explicit_plane = None;
    let mut tool_number = None;
    let mut values = Vec::new();

    for token in fields.iter() {
        if let Some(plane) = parse_work_plane(token) {
            explicit_plane = Some(plane);
        } else if let Some(tool) = parse_tool(token) {
            tool_number = Some(tool);
        } else if let Some(value) = parse_number(token) {
            if let Some(f) = token_face(token) {
                face.get_or_insert(f);
            }
            values.push(value);
        } else if let Some(f) = token_face(token) {
            face.get_or_insert(f);
        } else if values.len() < MIN_VALUES {
            return Err(fields.invalid(["x", "y"][values.len()], token));
        } else {
            trace!(token, "dropping unknown punch token");
        }
    }

    if values.len() < MIN_VALUES {
        return Err(DecodeError::TooFewFields {
            kind: fields.kind(),
            minimum: MIN_VALUES,
            found: values.len(),
        });
    }
    for value in values.iter().skip(5) {
        trace!(value, "dropping extra punch value");
    }

    let work_plane = explicit_plane
        .or_else(|| face.map(|f| f.work_plane()))
        .unwrap_or_default();

    let punch = Punch {
        x: values[0],
        y: values[1],
        depth: values.get(2).copied().unwrap_or(DEFAULT_PUNCH_DEPTH),
        diameter: values.get(3).copied().unwrap_or(DEFAULT_PUNCH_DIAMETER),
        angle: values.get(4).copied().unwrap_or(0.0),
        work_plane,
        tool_number,
    };
    debug!(?encoding, x = punch.x, y = punch.y, plane = %punch.work_plane, "punch decoded");
    Ok(punch)
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_punch(fields, ctx).map(Feature::Punch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Face, WorkPlane};
    use crate::parser::DecoderRegistry;

    fn punch(tokens: &[&str]) -> DecodeResult<Punch> {
        let registry = DecoderRegistry::standard();
        let raw: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        decode_punch(&Fields::new(BlockKind::Punch, &raw), &registry.context(None))
    }

    #[test]
    fn test_defaults() {
        let p = punch(&["120", "35"]).expect("Should parse");
        assert_eq!((p.x, p.y), (120.0, 35.0));
        assert_eq!(p.depth, 0.5);
        assert_eq!(p.diameter, 3.0);
        assert_eq!(p.angle, 0.0);
        assert_eq!(p.work_plane, WorkPlane::default());
        assert_eq!(p.tool_number, None);
    }

    #[test]
    fn test_standard_full() {
        let p = punch(&["120", "35", "1", "4", "15", "E3", "T7"]).expect("Should parse");
        assert_eq!(p.depth, 1.0);
        assert_eq!(p.diameter, 4.0);
        assert_eq!(p.angle, 15.0);
        assert_eq!(p.work_plane.index(), 3);
        assert_eq!(p.tool_number, Some(7));
    }

    #[test]
    fn test_legacy_face_selects_plane() {
        let p = punch(&["o", "120.00u", "35.00"]).expect("Should parse");
        assert_eq!(p.work_plane, Face::Top.work_plane());
        let p = punch(&["h120", "35"]).expect("Should parse");
        assert_eq!(p.work_plane, Face::Rear.work_plane());
    }

    #[test]
    fn test_explicit_plane_wins() {
        let p = punch(&["o", "120", "35", "E0"]).expect("Should parse");
        assert_eq!(p.work_plane.index(), 0);
    }

    #[test]
    fn test_too_few() {
        assert!(matches!(
            punch(&["v", "120"]),
            Err(DecodeError::TooFewFields { minimum: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_parse_tool() {
        assert_eq!(parse_tool("T12"), Some(12));
        assert_eq!(parse_tool("T"), None);
        assert_eq!(parse_tool("Tx"), None);
    }
}
