//! Free-form contour (UE) decoder.

use tracing::{debug, trace};

use super::fields::{parse_number, parse_work_plane, Fields};
use super::registry::DecodeContext;
use crate::error::{DecodeError, DecodeResult};
use crate::geometry::{classify, is_closed};
use crate::model::{ContourPoint, Feature, FreeformContour, Point2D, SegmentKind, WorkPlane};

/// Fewest vertices of a free-form contour.
const MIN_POINTS: usize = 2;

/// Field encoding of a free-form block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeformEncoding {
    /// Segment letters introduce each vertex.
    Coded,
    /// Bare `(x, y)` pairs joined by lines.
    Plain,
}

pub fn detect_freeform_encoding(fields: &Fields<'_>) -> FreeformEncoding {
    if fields.iter().any(|t| SegmentKind::from_code(t).is_some()) {
        FreeformEncoding::Coded
    } else {
        FreeformEncoding::Plain
    }
}

fn closure_keyword(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "closed" => Some(true),
        "open" => Some(false),
        _ => None,
    }
}

/// Cursor over the value tokens of a block.
struct Cursor<'f, 'a> {
    fields: &'f Fields<'a>,
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'f, 'a> Cursor<'f, 'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next_number(&mut self, name: &str) -> DecodeResult<f64> {
        let token = self.peek().ok_or_else(|| DecodeError::MissingField {
            kind: self.fields.kind(),
            field: name.to_string(),
        })?;
        let value = parse_number(token).ok_or_else(|| self.fields.invalid(name, token))?;
        self.pos += 1;
        Ok(value)
    }

    fn next_point(&mut self, name: &str) -> DecodeResult<Point2D> {
        let x = self.next_number(name)?;
        let y = self.next_number(name)?;
        Ok(Point2D::new(x, y))
    }
}

fn read_coded(cursor: &mut Cursor<'_, '_>) -> DecodeResult<Vec<ContourPoint>> {
    let mut points = Vec::new();
    while let Some(token) = cursor.peek() {
        let Some(segment_kind) = SegmentKind::from_code(token) else {
            // Uncoded pair inside a coded block.
            let p = cursor.next_point("x")?;
            points.push(ContourPoint::line(p.x, p.y));
            continue;
        };
        cursor.pos += 1;
        let p = cursor.next_point("x")?;
        let mut point = ContourPoint {
            segment_kind,
            ..ContourPoint::line(p.x, p.y)
        };
        match (segment_kind, token) {
            (SegmentKind::Line, _) => {}
            (SegmentKind::Arc, "C" | "c") => point.center = Some(cursor.next_point("center")?),
            (SegmentKind::Arc, _) => point.radius = Some(cursor.next_number("radius")?),
            (SegmentKind::Bulge, _) => point.bulge = Some(cursor.next_number("bulge")?),
            (SegmentKind::Bezier, _) => {
                let c1 = cursor.next_point("control_point")?;
                let c2 = cursor.next_point("control_point")?;
                point.control_points = Some(vec![c1, c2]);
            }
            (SegmentKind::Spline, _) => point.tension = Some(cursor.next_number("tension")?),
        }
        points.push(point);
    }
    Ok(points)
}

fn read_plain(cursor: &mut Cursor<'_, '_>) -> DecodeResult<Vec<ContourPoint>> {
    let mut points = Vec::new();
    while cursor.tokens.len() - cursor.pos >= 2 {
        let p = cursor.next_point("x")?;
        points.push(ContourPoint::line(p.x, p.y));
    }
    if let Some(token) = cursor.peek() {
        trace!(token, "dropping unpaired free-form value");
    }
    Ok(points)
}

/// Decode a UE block.
pub fn decode_freeform_contour(
    fields: &Fields<'_>,
    _ctx: &DecodeContext<'_>,
) -> DecodeResult<FreeformContour> {
    let encoding = detect_freeform_encoding(fields);
    let mut work_plane = WorkPlane::default();
    let mut declared_closed = None;
    let mut tokens = Vec::new();

    for token in fields.iter() {
        if let Some(plane) = parse_work_plane(token) {
            work_plane = plane;
        } else if let Some(closed) = closure_keyword(token) {
            declared_closed = Some(closed);
        } else {
            tokens.push(token);
        }
    }

    let mut cursor = Cursor {
        fields,
        tokens,
        pos: 0,
    };
    let points = match encoding {
        FreeformEncoding::Coded => read_coded(&mut cursor)?,
        FreeformEncoding::Plain => read_plain(&mut cursor)?,
    };

    if points.len() < MIN_POINTS {
        return Err(DecodeError::TooFewFields {
            kind: fields.kind(),
            minimum: MIN_POINTS * 2,
            found: cursor.tokens.len(),
        });
    }

    let vertices: Vec<Point2D> = points.iter().map(ContourPoint::point).collect();
    let closed = declared_closed.unwrap_or_else(|| is_closed(&vertices));
    let contour_kind = classify(&vertices);

    debug!(?encoding, points = points.len(), closed, "free-form contour decoded");
    Ok(FreeformContour {
        points,
        closed,
        contour_kind,
        work_plane,
    })
}

pub fn decode(fields: &Fields<'_>, ctx: &DecodeContext<'_>) -> DecodeResult<Feature> {
    decode_freeform_contour(fields, ctx).map(Feature::FreeformContour)
}
