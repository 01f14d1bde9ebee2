//! Field utilities shared by all block decoders.

use tracing::trace;

use crate::error::{DecodeError, DecodeResult};
use crate::model::{BlockKind, Face, WorkPlane};

/// Historical encoding of a face-bearing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Single-letter face codes precede or prefix coordinate groups.
    Legacy,
    /// Purely positional numeric groups.
    Standard,
}

/// Split a leading face letter off a token when it is glued to a number.
pub fn split_face_prefix(token: &str) -> (Option<Face>, &str) {
    let mut chars = token.chars();
    if let (Some(c), Some(next)) = (chars.next(), chars.next()) {
        if let Some(face) = Face::from_letter(c) {
            if c.is_ascii_lowercase() && (next.is_ascii_digit() || matches!(next, '-' | '+' | '.')) {
                return (Some(face), &token[1..]);
            }
        }
    }
    (None, token)
}

/// A lone one-character face token.
pub fn face_token(token: &str) -> Option<Face> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => Face::from_letter(c),
        _ => None,
    }
}

/// Face carried by a token, either alone or as a numeric prefix.
pub fn token_face(token: &str) -> Option<Face> {
    face_token(token).or_else(|| split_face_prefix(token).0)
}

/// Whether a token carries a face code.
pub fn is_face_coded(token: &str) -> bool {
    token_face(token).is_some()
}

/// Parse a number, tolerating a face prefix and a trailing letter suffix
/// such as the legacy `u`.
pub fn parse_number(token: &str) -> Option<f64> {
    let (_, rest) = split_face_prefix(token.trim());
    if !rest.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Ok(v) = rest.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    rest.strip_suffix(|c: char| c.is_ascii_alphabetic())
        .and_then(|stripped| stripped.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse a work-plane token `E[0-9]`.
pub fn parse_work_plane(token: &str) -> Option<WorkPlane> {
    WorkPlane::parse(token)
}

/// `E` followed by digits that is not a legal work plane, e.g. `E12`.
pub fn is_malformed_work_plane(token: &str) -> bool {
    let rest = match token.strip_prefix('E') {
        Some(rest) => rest,
        None => return false,
    };
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()) && WorkPlane::parse(token).is_none()
}

/// Parse a key=value pair from a token.
pub fn parse_key_value(token: &str) -> Option<(&str, &str)> {
    let eq_pos = token.find('=')?;
    let key = token[..eq_pos].trim();
    let value = token[eq_pos + 1..].trim();
    Some((key, value))
}

/// Classify a whole field list as legacy or standard encoding.
pub fn detect_encoding(fields: &Fields<'_>) -> Encoding {
    if fields.iter().any(is_face_coded) {
        Encoding::Legacy
    } else {
        Encoding::Standard
    }
}

/// Meaning guessed for an optional trailing number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrailingValue {
    Tolerance(f64),
    Angle(f64),
    FeedRate(f64),
}

/// Guess what an unrecognised trailing number is from its magnitude.
pub fn classify_trailing(value: f64) -> Option<TrailingValue> {
    let magnitude = value.abs();
    if magnitude > 0.0 && magnitude < 1.0 {
        Some(TrailingValue::Tolerance(value))
    } else if magnitude <= 360.0 {
        Some(TrailingValue::Angle(value))
    } else if value > 360.0 && value <= 50_000.0 {
        Some(TrailingValue::FeedRate(value))
    } else {
        None
    }
}

/// Safe, indexed access over a block's tokens.
///
/// Tokens are trimmed and empty ones dropped on construction.
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    kind: BlockKind,
    tokens: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub fn new(kind: BlockKind, raw: &'a [String]) -> Self {
        let tokens = raw
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        Self { kind, tokens }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.tokens.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().copied()
    }

    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    pub fn number(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(parse_number)
    }

    /// Mandatory number at `index`.
    pub fn require_number(&self, index: usize, name: &str) -> DecodeResult<f64> {
        let token = self.get(index).ok_or_else(|| DecodeError::MissingField {
            kind: self.kind,
            field: name.to_string(),
        })?;
        parse_number(token).ok_or_else(|| self.invalid(name, token))
    }

    /// Build an `InvalidNumber` error for this block.
    pub fn invalid(&self, name: &str, token: &str) -> DecodeError {
        DecodeError::InvalidNumber {
            kind: self.kind,
            field: name.to_string(),
            value: token.to_string(),
        }
    }

    /// First legal work-plane token, if any.
    pub fn work_plane(&self) -> Option<WorkPlane> {
        self.iter().find_map(parse_work_plane)
    }

    /// Numbers in order, skipping face tokens, work planes and keywords.
    pub fn numbers(&self) -> Vec<f64> {
        self.iter()
            .filter(|t| face_token(t).is_none())
            .filter_map(|t| {
                let v = parse_number(t);
                if v.is_none() {
                    trace!(kind = %self.kind, token = t, "skipping non-numeric token");
                }
                v
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    // ==================== parse_number tests ====================

    #[test]
    fn test_parse_number_plain() {
        assert_eq!(parse_number("163.20"), Some(163.2));
        assert_eq!(parse_number("-5"), Some(-5.0));
        assert_eq!(parse_number("  12 "), Some(12.0));
    }

    #[test]
    fn test_parse_number_with_suffix() {
        assert_eq!(parse_number("0.00u"), Some(0.0));
        assert_eq!(parse_number("1857.15u"), Some(1857.15));
        assert_eq!(parse_number("10s"), Some(10.0));
    }

    #[test]
    fn test_parse_number_with_face_prefix() {
        assert_eq!(parse_number("v1857.15"), Some(1857.15));
        assert_eq!(parse_number("o-20.5u"), Some(-20.5));
        assert_eq!(parse_number("h.5"), Some(0.5));
    }

    #[test]
    fn test_parse_number_rejects_words() {
        assert_eq!(parse_number("v"), None);
        assert_eq!(parse_number("E1"), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("u"), None);
        assert_eq!(parse_number("10rA"), None);
        assert_eq!(parse_number("10uu"), None);
    }

    // ==================== face tests ====================

    #[test]
    fn test_face_token() {
        assert_eq!(face_token("v"), Some(Face::Web));
        assert_eq!(face_token("o"), Some(Face::Top));
        assert_eq!(face_token("x"), None);
        assert_eq!(face_token("vv"), None);
    }

    #[test]
    fn test_split_face_prefix() {
        assert_eq!(split_face_prefix("u250.0"), (Some(Face::Bottom), "250.0"));
        assert_eq!(split_face_prefix("250.0u"), (None, "250.0u"));
        assert_eq!(split_face_prefix("hole"), (None, "hole"));
    }

    #[test]
    fn test_is_face_coded() {
        assert!(is_face_coded("h"));
        assert!(is_face_coded("h100"));
        assert!(!is_face_coded("100h"));
        assert!(!is_face_coded("E1"));
    }

    // ==================== work plane tests ====================

    #[test]
    fn test_work_plane_tokens() {
        assert_eq!(parse_work_plane("E4").map(|p| p.index()), Some(4));
        assert!(is_malformed_work_plane("E12"));
        assert!(!is_malformed_work_plane("E1"));
        assert!(!is_malformed_work_plane("Edge"));
        assert!(!is_malformed_work_plane("12"));
    }

    // ==================== encoding tests ====================

    #[test]
    fn test_detect_encoding() {
        let legacy = strings(&["v", "1857.15", "163.20", "22.00", "0.00"]);
        assert_eq!(detect_encoding(&Fields::new(BlockKind::Hole, &legacy)), Encoding::Legacy);

        let prefixed = strings(&["o100.0", "20", "22"]);
        assert_eq!(detect_encoding(&Fields::new(BlockKind::Hole, &prefixed)), Encoding::Legacy);

        let standard = strings(&["1857.15", "163.20", "22.00", "0.00", "0", "E1"]);
        assert_eq!(
            detect_encoding(&Fields::new(BlockKind::Hole, &standard)),
            Encoding::Standard
        );
    }

    // ==================== trailing heuristic tests ====================

    #[test]
    fn test_classify_trailing() {
        assert_eq!(classify_trailing(0.05), Some(TrailingValue::Tolerance(0.05)));
        assert_eq!(classify_trailing(45.0), Some(TrailingValue::Angle(45.0)));
        assert_eq!(classify_trailing(1200.0), Some(TrailingValue::FeedRate(1200.0)));
        assert_eq!(classify_trailing(-900.0), None);
        assert_eq!(classify_trailing(1.0e6), None);
    }

    // ==================== Fields tests ====================

    #[test]
    fn test_fields_drops_blank_tokens() {
        let raw = strings(&["", " 10 ", "  ", "20"]);
        let fields = Fields::new(BlockKind::Punch, &raw);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get(0), Some("10"));
        assert_eq!(fields.get(5), None);
    }

    #[test]
    fn test_require_number_errors() {
        let raw = strings(&["10", "abc"]);
        let fields = Fields::new(BlockKind::Cut, &raw);
        assert_eq!(fields.require_number(0, "x"), Ok(10.0));
        assert!(matches!(
            fields.require_number(1, "y"),
            Err(DecodeError::InvalidNumber { .. })
        ));
        assert!(matches!(
            fields.require_number(2, "width"),
            Err(DecodeError::MissingField { .. })
        ));
    }

    #[test]
    fn test_fields_numbers_and_plane() {
        let raw = strings(&["v", "10u", "E2", "o20", "slot", "30"]);
        let fields = Fields::new(BlockKind::Hole, &raw);
        assert_eq!(fields.numbers(), vec![10.0, 20.0, 30.0]);
        assert_eq!(fields.work_plane().map(|p| p.index()), Some(2));
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("time=12.5"), Some(("time", "12.5")));
        assert_eq!(parse_key_value(" records = 10 "), Some(("records", "10")));
        assert_eq!(parse_key_value("noequals"), None);
    }
}
