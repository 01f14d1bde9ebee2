//! End record (EN) decoder.

use tracing::{debug, trace};

use super::fields::{parse_key_value, parse_number, Fields};
use super::registry::DecodeContext;
use crate::error::DecodeResult;
use crate::model::{EndMarker, Feature};

/// Field encoding of an end record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndEncoding {
    /// `key=value` tokens.
    Keyed,
    /// time, checksum, records, errors, warnings in that order.
    Positional,
}

pub fn detect_end_encoding(fields: &Fields<'_>) -> EndEncoding {
    if fields.iter().any(|t| t.contains('=')) {
        EndEncoding::Keyed
    } else {
        EndEncoding::Positional
    }
}

fn parse_count(value: &str) -> Option<u32> {
    parse_number(value)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u32)
}

fn set(marker: &mut EndMarker, key: &str, value: &str) {
    match key.to_ascii_lowercase().as_str() {
        "time" => marker.processing_time = parse_number(value),
        "checksum" => marker.checksum = Some(value.to_string()).filter(|v| !v.is_empty()),
        "records" => marker.record_count = parse_count(value),
        "errors" => marker.error_count = parse_count(value),
        "warnings" => marker.warning_count = parse_count(value),
        other => trace!(key = other, value, "dropping unknown end record key"),
    }
}

/// Decode an EN block. Every field is optional.
pub fn decode_end(fields: &Fields<'_>, _ctx: &DecodeContext<'_>) -> DecodeResult<EndMarker> {
    let encoding = detect_end_encoding(fields);
    let mut marker = EndMarker::default();

    match encoding {
        EndEncoding::Keyed => {
            for token in fields.iter() {
                match parse_key_value(token) {
                    Some((key, value)) => set(&mut marker, key, value),
                    None => trace!(token, "dropping unkeyed end record token"),
                }
            }
        }
        EndEncoding::Positional => {
            const KEYS: [&str; 5] = ["time", "checksum", "records", "errors", "warnings"];
            for (key, token) in KEYS.iter().zip(fields.iter()) {
                set(&mut marker, key, token);
            }
        }
    }

    debug!(?encoding, records = ?marker.record_count, "end record decoded");
    Ok(marker)
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_end(fields, ctx).map(Feature::End)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BlockKind;
    use crate::parser::DecoderRegistry;
    use pretty_assertions::assert_eq;

    fn end(tokens: &[&str]) -> EndMarker {
        let registry = DecoderRegistry::standard();
        let raw: Vec<String> = tokens.iter().map(|s| s.to_string()).collect();
        decode_end(&Fields::new(BlockKind::End, &raw), &registry.context(None)).expect("Should parse")
    }

    #[test]
    fn test_empty_end() {
        assert_eq!(end(&[]), EndMarker::default());
    }

    #[test]
    fn test_keyed_end() {
        let marker = end(&["records=12", "checksum=A1B2", "time=3.5", "warnings=1", "colour=red"]);
        assert_eq!(
            marker,
            EndMarker {
                processing_time: Some(3.5),
                checksum: Some("A1B2".to_string()),
                record_count: Some(12),
                error_count: None,
                warning_count: Some(1),
            }
        );
    }

    #[test]
    fn test_positional_end() {
        let marker = end(&["3.5", "A1B2", "12", "0", "2"]);
        assert_eq!(marker.processing_time, Some(3.5));
        assert_eq!(marker.checksum.as_deref(), Some("A1B2"));
        assert_eq!(marker.record_count, Some(12));
        assert_eq!(marker.error_count, Some(0));
        assert_eq!(marker.warning_count, Some(2));
    }

    #[test]
    fn test_positional_garbage_is_tolerated() {
        let marker = end(&["soon", "A1B2", "-3"]);
        assert_eq!(marker.processing_time, None);
        assert_eq!(marker.record_count, None);
    }
}
