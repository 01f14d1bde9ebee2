//! Text marking (SI) decoder.

use tracing::debug;

use super::fields::{
    detect_encoding, face_token, parse_number, parse_work_plane, split_face_prefix, Encoding,
    Fields,
};
use super::registry::DecodeContext;
use crate::config::{DEFAULT_MARKING_DEPTH, DEFAULT_MARKING_HEIGHT};
use crate::error::{DecodeError, DecodeResult};
use crate::model::{Feature, Marking, MarkingMethod};

/// x, y.
const MIN_VALUES: usize = 2;

/// Split a condensed `<height>r<text>` token.
pub fn split_condensed(token: &str) -> Option<(f64, &str)> {
    let pos = token.find(|c: char| c == 'r' || c == 'R')?;
    let (head, tail) = (&token[..pos], &token[pos + 1..]);
    if head.is_empty() || !head.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }
    head.parse().ok().map(|height| (height, tail))
}

fn strip_quotes(text: &str) -> &str {
    text.trim().trim_matches(|c: char| c == '"' || c == '\'')
}

/// Marking fields up to the text, plus the index of the first text token.
fn read_marking(fields: &Fields<'_>) -> DecodeResult<(Marking, usize)> {
    let encoding = detect_encoding(fields);
    let tokens = fields.tokens();
    let numeric_slots = match encoding {
        Encoding::Legacy => 3,
        Encoding::Standard => 5,
    };

    let mut marking = Marking::default();
    let mut numbers = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        if let Some(plane) = parse_work_plane(token) {
            marking.work_plane = plane;
        } else if let Some(method) = MarkingMethod::from_keyword(token) {
            marking.method = method;
        } else if let (true, Some(face)) = (numbers.is_empty(), face_token(token)) {
            marking.face.get_or_insert(face);
        } else {
            let is_last = i + 1 == tokens.len();
            let has_slot = numbers.len() < numeric_slots;
            let trailing_text = is_last && numbers.len() >= MIN_VALUES;
            let value = match parse_number(token) {
                Some(v) if has_slot && !trailing_text => v,
                _ => break,
            };
            let condensed = encoding == Encoding::Legacy && split_condensed(token).is_some();
            if condensed && numbers.len() >= MIN_VALUES {
                break;
            }
            if let (Some(face), _) = split_face_prefix(token) {
                marking.face.get_or_insert(face);
            }
            numbers.push(value);
        }
        i += 1;
    }

    if numbers.len() < MIN_VALUES {
        return Err(match tokens.get(i) {
            Some(token) => fields.invalid(["x", "y"][numbers.len()], token),
            None => DecodeError::TooFewFields {
                kind: fields.kind(),
                minimum: MIN_VALUES,
                found: numbers.len(),
            },
        });
    }

    marking.x = numbers[0];
    marking.y = numbers[1];
    marking.height = DEFAULT_MARKING_HEIGHT;
    marking.depth = DEFAULT_MARKING_DEPTH;

    let mut text_tokens: Vec<&str> = Vec::new();
    match encoding {
        Encoding::Legacy => {
            marking.angle = numbers.get(2).copied().unwrap_or(0.0);
            if let Some(token) = tokens.get(i) {
                if let Some((height, text)) = split_condensed(token) {
                    marking.height = height;
                    if !text.is_empty() {
                        text_tokens.push(text);
                    }
                    i += 1;
                } else if let (Some(height), true) = (parse_number(token), i + 1 < tokens.len()) {
                    marking.height = height;
                    i += 1;
                }
            }
        }
        Encoding::Standard => {
            marking.height = numbers.get(2).copied().unwrap_or(DEFAULT_MARKING_HEIGHT);
            marking.angle = numbers.get(3).copied().unwrap_or(0.0);
            marking.depth = numbers.get(4).copied().unwrap_or(DEFAULT_MARKING_DEPTH);
        }
    }

    let text_start = i.min(tokens.len());
    for &token in &tokens[text_start..] {
        if let Some(plane) = parse_work_plane(token) {
            marking.work_plane = plane;
        } else {
            text_tokens.push(token);
        }
    }
    marking.text = strip_quotes(&text_tokens.join(" ")).to_string();

    debug!(?encoding, text = %marking.text, height = marking.height, "marking decoded");
    Ok((marking, text_start))
}

/// Index of the first token that belongs to the marking text.
///
/// A condensed `<height>r<text>` token counts as text.
pub fn text_start(fields: &Fields<'_>) -> DecodeResult<usize> {
    read_marking(fields).map(|(_, start)| start)
}

/// Decode an SI block.
///
/// Legacy: `face x y [angle]`, then either a condensed `<height>r<text>`
/// token or `height text...`. Standard: `x y [height] [angle] [depth]
/// [E#] [method] text...`. A number that is the last token is text.
pub fn decode_marking(fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<Marking> {
    read_marking(fields).map(|(marking, _)| marking)
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_marking(fields, ctx).map(Feature::Marking)
}
